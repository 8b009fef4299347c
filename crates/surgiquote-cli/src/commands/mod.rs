//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod import;
pub mod quotes;
pub mod report;
pub mod serve;

use std::path::{Path, PathBuf};

use tracing::debug;

use surgiquote_core::{QuoteStore, SurgiquoteConfig};

/// Per-user configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("surgiquote")
        .join("config.json")
}

/// The configuration file in effect: `-c` if given, else the per-user one.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit `-c` path must exist; the per-user file is optional.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SurgiquoteConfig> {
    if let Some(path) = config_path {
        return SurgiquoteConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config at {}", path.display());
        Ok(SurgiquoteConfig::from_file(&path)?)
    } else {
        Ok(SurgiquoteConfig::default())
    }
}

/// Open the quote database, preferring `--database`/`SURGIQUOTE_DB`.
pub fn open_store(
    config: &SurgiquoteConfig,
    database: Option<&Path>,
) -> anyhow::Result<QuoteStore> {
    let path = database.unwrap_or(&config.storage.database_path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    debug!("Opening quote database {}", path.display());
    QuoteStore::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))
}
