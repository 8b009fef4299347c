//! Extract command - run the draft pipeline on a document and print the result.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use surgiquote_core::{ExtractionResult, QuoteImporter, QuoteParser, extract_document_text};

use super::load_config;
use crate::display::{OutputFormat, format_draft};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (.pdf or .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which rule produced each field
    #[arg(long)]
    show_sources: bool,

    /// Print the normalized text the rules ran against
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
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

    let text = match extension.as_str() {
        "pdf" => extract_document_text(&fs::read(&args.input)?),
        "txt" | "text" => fs::read_to_string(&args.input)?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };
    debug!("Read {} characters from {}", text.len(), args.input.display());

    let importer = QuoteImporter::from_config(&config);
    let result = importer.parser().parse(&text);

    let output = match args.format {
        OutputFormat::Json if args.show_sources => serde_json::to_string_pretty(&result)?,
        OutputFormat::Text => {
            let mut output = format_draft(&result.draft, OutputFormat::Text)?;
            if args.show_sources {
                output.push_str(&sources_text(&result));
            }
            output
        }
        format => format_draft(&result.draft, format)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
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

    if args.show_text {
        eprintln!();
        eprintln!("{}", style("Normalized text:").dim());
        eprintln!("{}", result.normalized_text);
    }

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    Ok(())
}

fn sources_text(result: &ExtractionResult) -> String {
    let mut output = String::from("\nSources:\n");
    for (field, source) in &result.fields {
        output.push_str(&format!("  {:<24} {:?}\n", field, source));
    }

    let defaulted = result.defaulted_fields();
    if !defaulted.is_empty() {
        output.push_str(&format!("\nDefaulted: {}\n", defaulted.join(", ")));
    }
    output
}
