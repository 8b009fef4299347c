//! Quotes command - manage stored quotes.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use surgiquote_core::{QuoteFilter, QuoteInput};

use super::{load_config, open_store};
use crate::display::{OutputFormat, format_quote, format_quotes};

/// Arguments for the quotes command.
#[derive(Args)]
pub struct QuotesArgs {
    #[command(subcommand)]
    command: QuotesCommand,
}

#[derive(Subcommand)]
enum QuotesCommand {
    /// List quotes, newest first
    List {
        /// Only quotes whose procedure contains this text
        #[arg(long)]
        procedure: Option<String>,

        /// Only quotes whose surgeon contains this text
        #[arg(long)]
        surgeon: Option<String>,

        /// Maximum number of quotes
        #[arg(short = 'n', long, default_value_t = surgiquote_core::store::LIST_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a single quote
    Show {
        /// Quote ID
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a quote from a JSON payload ("-" reads stdin)
    Create {
        /// JSON file with the quote fields
        input: PathBuf,
    },

    /// Replace a quote with a JSON payload ("-" reads stdin)
    Update {
        /// Quote ID
        id: String,

        /// JSON file with the quote fields
        input: PathBuf,
    },

    /// Delete a quote
    Delete {
        /// Quote ID
        id: String,
    },

    /// List distinct procedure names
    Procedures,

    /// List distinct surgeon names
    Surgeons,
}

pub async fn run(
    args: QuotesArgs,
    config_path: Option<&str>,
    database: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config, database)?;

    match args.command {
        QuotesCommand::List {
            procedure,
            surgeon,
            limit,
            format,
        } => {
            let filter = QuoteFilter {
                procedure_name: procedure,
                surgeon_name: surgeon,
                limit: Some(limit),
            };
            print_output(&format_quotes(&store.list(&filter)?, format)?);
        }
        QuotesCommand::Show { id, format } => {
            let quote = store
                .get(&id)?
                .ok_or_else(|| anyhow::anyhow!("Quote not found: {}", id))?;
            print_output(&format_quote(&quote, format)?);
        }
        QuotesCommand::Create { input } => {
            let quote = store.create(read_input(&input)?)?;
            println!("{} Created quote {}", style("✓").green(), quote.id);
        }
        QuotesCommand::Update { id, input } => {
            let quote = store
                .update(&id, read_input(&input)?)?
                .ok_or_else(|| anyhow::anyhow!("Quote not found: {}", id))?;
            println!(
                "{} Updated quote {} (total {})",
                style("✓").green(),
                quote.id,
                quote.total_cost
            );
        }
        QuotesCommand::Delete { id } => {
            if !store.delete(&id)? {
                anyhow::bail!("Quote not found: {}", id);
            }
            println!("{} Deleted quote {}", style("✓").green(), id);
        }
        QuotesCommand::Procedures => {
            for name in store.procedures()? {
                println!("{}", name);
            }
        }
        QuotesCommand::Surgeons => {
            for name in store.surgeons()? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<QuoteInput> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };

    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid quote payload in {}: {}", path.display(), e))
}

fn print_output(output: &str) {
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}
