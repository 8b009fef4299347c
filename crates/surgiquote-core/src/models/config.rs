//! Configuration structures for the quote service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::import::rules::keywords::{DEFAULT_EQUIPMENT_TERMS, DEFAULT_MEDICATION_TERMS};

/// Main configuration for surgiquote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgiquoteConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Draft extraction configuration.
    pub extraction: ExtractionConfig,

    /// Quote storage configuration.
    pub storage: StorageConfig,

    /// HTTP API configuration.
    pub server: ServerConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum trimmed text length for a document to count as readable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 1,
        }
    }
}

/// Draft extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Medication terms whose presence fills `medications_included`.
    pub medication_terms: Vec<String>,

    /// Equipment terms whose presence fills `additional_equipment`.
    pub equipment_terms: Vec<String>,

    /// Anesthesia type stored when an accepted draft has none.
    pub default_anesthesia_type: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            medication_terms: DEFAULT_MEDICATION_TERMS.iter().map(|t| t.to_string()).collect(),
            equipment_terms: DEFAULT_EQUIPMENT_TERMS.iter().map(|t| t.to_string()).collect(),
            default_anesthesia_type: "Anestesia General".to_string(),
        }
    }
}

/// Quote storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("quotes.db"),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on.
    pub bind_address: String,

    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl SurgiquoteConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage": {"database_path": "/tmp/q.db"}}"#).unwrap();

        let config = SurgiquoteConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/q.db"));
        assert_eq!(config.extraction.medication_terms.len(), 5);
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SurgiquoteConfig::default();
        config.extraction.equipment_terms.push("catéter".to_string());
        config.save(&path).unwrap();

        let loaded = SurgiquoteConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.equipment_terms.last().map(String::as_str), Some("catéter"));
    }
}
