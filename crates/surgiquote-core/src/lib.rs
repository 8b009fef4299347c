//! Core library for surgical quote management.
//!
//! This crate provides:
//! - PDF text extraction
//! - Rule-based extraction of quote drafts from document text
//! - SQLite quote storage
//! - Pricing and dashboard reports

pub mod error;
pub mod import;
pub mod models;
pub mod pdf;
pub mod reports;
pub mod store;

pub use error::{ImportError, PdfError, QuoteError, Result, StoreError};
pub use import::{
    ExtractionResult, ImportOutcome, QuoteDraftParser, QuoteImporter, QuoteParser, extract_draft,
    normalize_text,
};
pub use models::config::SurgiquoteConfig;
pub use models::quote::{Quote, QuoteDraft, QuoteInput, QuoteStatus, SurgicalPackage};
pub use models::report::{DashboardStats, PricingSuggestion, ProcedureCount};
pub use pdf::{PdfProcessor, extract_document_text};
pub use reports::{dashboard, pricing_suggestion};
pub use store::{QuoteFilter, QuoteStore};
