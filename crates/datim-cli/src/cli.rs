//! CLI argument definitions.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use datim_cli::logging::{LogConfig, LogFormat};
use datim_model::{DisplayProperty, LevelType};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "datim",
    version,
    about = "Query DATIM/DHIS2 analytics by name",
    long_about = "Resolve dimension and item names, compose analytics queries, and\n\
                  print the results as labelled tables.\n\n\
                  Connection settings come from --config and the DATIM_BASE_URL,\n\
                  DATIM_USERNAME and DATIM_PASSWORD environment variables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file.
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings. `--log-level` beats `-v/-q`, which beat `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.log_level.map(LevelFilter::from);
        let with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        LogConfig {
            level_filter: explicit.unwrap_or_else(|| self.verbosity.tracing_level_filter()),
            use_env_filter: explicit.is_none() && !self.verbosity.is_present(),
            with_ansi,
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            ..LogConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List every dimension on the server.
    Dimensions,

    /// List the items of a dimension.
    Items(ItemsArgs),

    /// Run an analytics query and print the normalized table.
    Query(QueryArgs),

    /// Look up a SQL view by name, optionally fetching its rows.
    SqlView(SqlViewArgs),
}

#[derive(Args)]
pub struct ItemsArgs {
    /// Dimension name, e.g. "Technical Area".
    #[arg(value_name = "DIMENSION")]
    pub dimension: String,

    /// Extra item fields to request, e.g. "id,displayName,code".
    #[arg(long)]
    pub fields: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Org unit name, e.g. "Nigeria".
    #[arg(long = "org-unit", value_name = "NAME")]
    pub org_unit: String,

    /// Org unit uid, for org units missing from the configuration.
    #[arg(long = "ou-id", value_name = "UID")]
    pub org_unit_id: Option<String>,

    /// Hierarchy level type the values are aggregated to.
    #[arg(long, default_value = "country")]
    pub level: LevelType,

    /// Numeric level for --level, for org units missing from the configuration.
    #[arg(long = "level-number", value_name = "N")]
    pub level_number: Option<u32>,

    /// Period token; repeat for several periods.
    #[arg(long = "period", value_name = "PERIOD", required = true)]
    pub periods: Vec<String>,

    /// Technical area item name, e.g. "PLHIV".
    #[arg(long = "technical-area", value_name = "NAME")]
    pub technical_area: String,

    /// "Targets / Results" item name; all items when omitted.
    #[arg(long = "value-type", value_name = "NAME")]
    pub value_types: Vec<String>,

    /// "Disaggregation Type" item name.
    #[arg(long = "disagg", value_name = "NAME")]
    pub disaggregations: Vec<String>,

    /// Auxiliary dimension selected in full. Needs at least one --disagg.
    #[arg(long = "dimension", value_name = "NAME")]
    pub dimensions: Vec<String>,

    /// Expand the organisation hierarchy into level columns.
    #[arg(long)]
    pub hierarchy: bool,

    /// Skip the metadata dictionary (codes are not substituted).
    #[arg(long = "no-metadata")]
    pub no_metadata: bool,

    /// Display property used by the server for names.
    #[arg(long = "display-property", value_enum)]
    pub display_property: Option<DisplayPropertyArg>,

    /// Print the composed query instead of running it.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the table as CSV instead of printing it.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct SqlViewArgs {
    /// Exact SQL view name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Fetch the view's rows instead of printing its uid.
    #[arg(long)]
    pub dataset: bool,

    /// Variable substitution `key=value`; repeatable.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value, conflicts_with = "filters")]
    pub variables: Vec<(String, String)>,

    /// Column filter `key=value`; repeatable.
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,

    /// Write the rows as CSV instead of printing them.
    #[arg(long, short = 'o', value_name = "PATH", requires = "dataset")]
    pub output: Option<PathBuf>,
}

/// Parses `key=value`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DisplayPropertyArg {
    Name,
    ShortName,
}

impl From<DisplayPropertyArg> for DisplayProperty {
    fn from(arg: DisplayPropertyArg) -> Self {
        match arg {
            DisplayPropertyArg::Name => Self::Name,
            DisplayPropertyArg::ShortName => Self::ShortName,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
