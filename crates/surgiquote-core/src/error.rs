//! Error types for the surgiquote-core library.

use thiserror::Error;

/// Main error type for the surgiquote library.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Quote storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Document import was rejected.
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// Quote payload failed validation.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by the SQLite quote store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to encode or decode a JSON column.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be decoded.
    #[error("corrupt value in column {column}: {value}")]
    Corrupt { column: String, value: String },
}

/// Reasons an extracted draft is not turned into a stored quote.
///
/// The messages are the ones shown to end users of the importer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The document produced no text at all.
    #[error("PDF vacío o no se pudo procesar")]
    NoText,

    /// No procedure name could be identified.
    #[error("No se pudo identificar el procedimiento")]
    MissingProcedure,

    /// No surgery duration in hours could be identified.
    #[error("No se pudo identificar la duración de la cirugía en horas")]
    MissingDuration,
}

impl ImportError {
    /// Headline for the rejection, distinguishing an unreadable document
    /// from one that simply lacks information.
    pub fn summary(&self) -> &'static str {
        match self {
            ImportError::NoText => "No se pudo extraer texto del PDF",
            ImportError::MissingProcedure | ImportError::MissingDuration => {
                "Información insuficiente en el PDF"
            }
        }
    }
}

/// Result type for the surgiquote library.
pub type Result<T> = std::result::Result<T, QuoteError>;
