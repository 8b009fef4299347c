//! Report command - pricing suggestions and dashboard statistics.

use std::path::Path;

use clap::{Args, Subcommand};

use surgiquote_core::{dashboard, pricing_suggestion};

use super::{load_config, open_store};
use crate::display::{OutputFormat, format_dashboard, format_pricing};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    command: ReportCommand,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Historical averages for a procedure
    Pricing {
        /// Procedure name or part of it
        procedure: String,
    },

    /// Totals, recent quotes and most quoted procedures
    Dashboard,
}

pub async fn run(
    args: ReportArgs,
    config_path: Option<&str>,
    database: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config, database)?;

    let output = match args.command {
        ReportCommand::Pricing { procedure } => {
            format_pricing(&pricing_suggestion(&store, &procedure)?, args.format)?
        }
        ReportCommand::Dashboard => format_dashboard(&dashboard(&store)?, args.format)?,
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
