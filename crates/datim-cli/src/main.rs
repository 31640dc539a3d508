//! `datim`: query DATIM analytics from the command line.

use std::process::ExitCode;

use clap::Parser;
use datim_cli::logging::init_logging;

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{load_config, run_dimensions, run_items, run_query, run_sql_view};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();

    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Command::Dimensions => run_dimensions(&config),
        Command::Items(args) => run_items(&config, args),
        Command::Query(args) => run_query(&config, args),
        Command::SqlView(args) => run_sql_view(&config, args),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
