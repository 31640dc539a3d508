use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use datim_cli::output::{frame_table, simple_table, write_csv};
use datim_client::{Credentials, DatimClient, DatimConfig, StaticOrgUnits};
use datim_model::{QuerySpec, SqlViewParams};

use crate::cli::{ItemsArgs, QueryArgs, SqlViewArgs};

/// Reads the configuration file (if any) and applies environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<DatimConfig> {
    let config = match path {
        Some(path) => DatimConfig::load(path)?,
        None => DatimConfig::new(String::new(), Credentials::default()),
    };
    let config = config.with_env_overrides();
    config
        .validate()
        .context("set base_url in --config or DATIM_BASE_URL")?;
    Ok(config)
}

pub fn run_dimensions(config: &DatimConfig) -> Result<()> {
    let client = DatimClient::new(config)?;
    let dimensions = client.catalog().list_dimensions()?;

    let table = simple_table(
        &["Name", "Id"],
        dimensions
            .into_iter()
            .map(|dimension| vec![dimension.name, dimension.id]),
    );
    println!("{table}");
    Ok(())
}

pub fn run_items(config: &DatimConfig, args: &ItemsArgs) -> Result<()> {
    let client = DatimClient::new(config)?;
    let items = client
        .catalog()
        .list_items(&args.dimension, args.fields.as_deref())?;

    let table = simple_table(
        &["Name", "Id", "Fields"],
        items.into_iter().map(|item| {
            let extra = item
                .extra
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            vec![item.name, item.id, extra]
        }),
    );
    println!("{table}");
    Ok(())
}

pub fn run_query(config: &DatimConfig, args: &QueryArgs) -> Result<()> {
    let span = info_span!("query", org_unit = %args.org_unit);
    let _guard = span.enter();

    let client = DatimClient::new(config)?;
    let org_units = org_units(config, args);
    let spec = query_spec(args, &client);

    if args.dry_run {
        let query = client.composer(&org_units).build_query(&spec)?;
        println!("{}", client.executor().analytics_url(&query));
        return Ok(());
    }

    match client.query(&spec, &org_units)? {
        Some(table) => emit(table, args.output.as_deref()),
        None => {
            println!("No data returned for {}.", args.org_unit);
            Ok(())
        }
    }
}

pub fn run_sql_view(config: &DatimConfig, args: &SqlViewArgs) -> Result<()> {
    let client = DatimClient::new(config)?;
    let resolver = client.sql_views();

    if !args.dataset {
        println!("{}", resolver.sql_view_id(&args.name)?);
        return Ok(());
    }

    let params = if !args.variables.is_empty() {
        Some(SqlViewParams::variables(args.variables.iter().cloned()))
    } else if !args.filters.is_empty() {
        Some(SqlViewParams::fields(args.filters.iter().cloned()))
    } else {
        None
    };

    let frame = resolver.fetch_dataset(&args.name, params.as_ref())?;
    emit(frame, args.output.as_deref())
}

fn org_units(config: &DatimConfig, args: &QueryArgs) -> StaticOrgUnits {
    let mut org_units = StaticOrgUnits::from_entries(config.org_units.clone());
    if let Some(uid) = &args.org_unit_id {
        org_units = org_units.with_unit(args.org_unit.as_str(), uid.as_str());
    }
    if let Some(level) = args.level_number {
        org_units = org_units.with_level(args.org_unit.as_str(), args.level, level);
    }
    org_units
}

fn query_spec(args: &QueryArgs, client: &DatimClient) -> QuerySpec {
    let display_property = args
        .display_property
        .map_or_else(|| client.display_property(), Into::into);
    QuerySpec::new(
        args.org_unit.as_str(),
        args.technical_area.as_str(),
        args.periods.iter().cloned(),
    )
    .with_level(args.level)
    .with_value_types(args.value_types.iter().cloned())
    .with_disaggregations(args.disaggregations.iter().cloned())
    .with_dimensions(args.dimensions.iter().cloned())
    .with_display_property(display_property)
    .with_metadata(!args.no_metadata)
    .with_hierarchy(args.hierarchy)
}

fn emit(mut frame: DataFrame, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if path.is_dir() {
                bail!("{} is a directory", path.display());
            }
            write_csv(&mut frame, path)?;
            info!(path = %path.display(), rows = frame.height(), "Wrote CSV");
            println!("Wrote {} rows to {}", frame.height(), path.display());
        }
        None => println!("{}", frame_table(&frame)?),
    }
    Ok(())
}
