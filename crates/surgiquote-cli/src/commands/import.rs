//! Import command - turn a single PDF into a stored quote.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use surgiquote_core::{QuoteImporter, extract_document_text};

use super::{load_config, open_store};
use crate::display::{OutputFormat, format_outcome};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Validate and print the draft without storing it
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(
    args: ImportArgs,
    config_path: Option<&str>,
    database: Option<&Path>,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Only PDF files can be imported: {}", args.input.display());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Extracting text from PDF...");

    let data = fs::read(&args.input)?;
    let text = extract_document_text(&data);

    pb.set_message("Building quote...");
    let importer = QuoteImporter::from_config(&config);

    let outcome = if args.dry_run {
        importer.preview(&text)
    } else {
        let store = open_store(&config, database)?;
        importer.import_text(&text, &store)?
    };

    pb.finish_and_clear();
    info!("Imported {} in {:?}", args.input.display(), start.elapsed());

    let output = format_outcome(&outcome, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    if !outcome.success {
        anyhow::bail!("{}", outcome.message);
    }

    if let Some(quote) = &outcome.quote {
        eprintln!(
            "{} Created quote {} in {:?}",
            style("✓").green(),
            quote.id,
            start.elapsed()
        );
    }

    Ok(())
}
