//! Serve command - run the HTTP API.

use std::path::Path;

use clap::Args;
use console::style;
use tracing::info;

use super::{load_config, open_store};
use crate::server::{self, AppState};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

pub async fn run(
    args: ServeArgs,
    config_path: Option<&str>,
    database: Option<&Path>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    let store = open_store(&config, database)?;
    let state = AppState::new(store, &config);
    let app = server::router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", config.server.bind_address, e))?;

    info!("Listening on {}", config.server.bind_address);
    println!(
        "{} Server running on http://{}/api",
        style("✓").green(),
        config.server.bind_address
    );

    axum::serve(listener, app).await?;
    Ok(())
}
