//! Batch command - import many PDF documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use surgiquote_core::{
    ImportOutcome, QuoteError, QuoteImporter, QuoteStore, extract_document_text,
};

use super::{load_config, open_store};
use crate::display::{OutputFormat, format_outcome};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Directory for one outcome file per document
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Keep going when a document is rejected or unreadable
    #[arg(long)]
    continue_on_error: bool,

    /// Validate documents without storing them
    #[arg(long)]
    dry_run: bool,
}

/// Result of importing a single file.
struct BatchResult {
    path: PathBuf,
    outcome: ImportOutcome,
    processing_time_ms: u64,
}

impl BatchResult {
    fn error(&self) -> Option<String> {
        if self.outcome.success {
            None
        } else if self.outcome.errors.is_empty() {
            Some(self.outcome.message.clone())
        } else {
            Some(self.outcome.errors.join("; "))
        }
    }
}

pub async fn run(
    args: BatchArgs,
    config_path: Option<&str>,
    database: Option<&Path>,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to import",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let store = if args.dry_run {
        None
    } else {
        Some(open_store(&config, database)?)
    };
    let importer = QuoteImporter::from_config(&config);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = import_single_file(&path, &importer, store.as_ref());
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        let result = BatchResult {
            path,
            outcome,
            processing_time_ms,
        };

        if let Some(message) = result.error() {
            if args.continue_on_error {
                warn!("Failed to import {}: {}", result.path.display(), message);
            } else {
                error!("Failed to import {}: {}", result.path.display(), message);
                pb.abandon();
                anyhow::bail!("Import failed for {}: {}", result.path.display(), message);
            }
        }

        if let Some(ref output_dir) = args.output_dir {
            write_outcome(output_dir, &result, args.format)?;
        }

        results.push(result);
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(ref summary_path) = args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| !r.outcome.success).collect();
    let successful = results.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error().unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn import_single_file(
    path: &Path,
    importer: &QuoteImporter,
    store: Option<&QuoteStore>,
) -> ImportOutcome {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => return ImportOutcome::failed(&QuoteError::from(e)),
    };

    let text = extract_document_text(&data);
    match store {
        Some(store) => importer
            .import_text(&text, store)
            .unwrap_or_else(|e| ImportOutcome::failed(&e)),
        None => importer.preview(&text),
    }
}

fn write_outcome(
    output_dir: &Path,
    result: &BatchResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = result
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("quote");

    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));
    fs::write(&output_path, format_outcome(&result.outcome, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "quote_id",
        "procedure_name",
        "surgeon_name",
        "surgery_duration_hours",
        "total_cost",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let status = if result.outcome.success { "success" } else { "error" };
        let quote_id = result
            .outcome
            .quote
            .as_ref()
            .map(|q| q.id.clone())
            .unwrap_or_default();

        match &result.outcome.extracted_data {
            Some(draft) => wtr.write_record([
                filename,
                status,
                &quote_id,
                &draft.procedure_name,
                &draft.surgeon_name,
                &draft.surgery_duration_hours.to_string(),
                &draft.total_cost.to_string(),
                &result.processing_time_ms.to_string(),
                &result.error().unwrap_or_default(),
            ])?,
            None => wtr.write_record([
                filename,
                status,
                &quote_id,
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                &result.error().unwrap_or_default(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
