//! CLI application for surgical quote management.

mod commands;
mod display;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, import, quotes, report, serve};

/// Surgical quotes - Build and price surgical quotes from PDF documents
#[derive(Parser)]
#[command(name = "surgiquote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the quote database (overrides the config file)
    #[arg(long, global = true, env = "SURGIQUOTE_DB")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a single PDF document as a quote
    Import(import::ImportArgs),

    /// Import multiple PDF documents
    Batch(batch::BatchArgs),

    /// Run extraction on a document without storing anything
    Extract(extract::ExtractArgs),

    /// Manage stored quotes
    Quotes(quotes::QuotesArgs),

    /// Pricing and dashboard reports
    Report(report::ReportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Run the HTTP API
    Serve(serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    let database = cli.database.as_deref();

    match cli.command {
        Commands::Import(args) => import::run(args, config_path, database).await,
        Commands::Batch(args) => batch::run(args, config_path, database).await,
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Quotes(args) => quotes::run(args, config_path, database).await,
        Commands::Report(args) => report::run(args, config_path, database).await,
        Commands::Config(args) => config::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path, database).await,
    }
}
