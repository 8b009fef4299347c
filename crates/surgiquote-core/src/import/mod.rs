//! Document import: text extraction, draft parsing and the acceptance policy.

mod normalize;
mod parser;
mod reconcile;
pub mod rules;

pub use normalize::normalize_text;
pub use parser::{ExtractionResult, FieldSource, QuoteDraftParser, extract_draft};
pub use reconcile::{CostBreakdown, Reconciliation, reconcile_costs};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ImportError, QuoteError, Result};
use crate::models::config::SurgiquoteConfig;
use crate::models::quote::{Quote, QuoteDraft, QuoteInput};
use crate::pdf::extract_document_text;
use crate::store::QuoteStore;

use rules::KeywordVocabulary;

/// Trait for quote draft parsers.
pub trait QuoteParser {
    /// Parse a draft from document text. Never fails.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Result of importing one document, as reported to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub quotes_created: usize,
    pub extracted_data: Option<QuoteDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    fn created(draft: QuoteDraft, quote: Quote) -> Self {
        Self {
            success: true,
            message: "Cotización creada exitosamente desde PDF".to_string(),
            quotes_created: 1,
            extracted_data: Some(draft),
            quote: Some(quote),
            errors: Vec::new(),
        }
    }

    fn previewed(draft: QuoteDraft) -> Self {
        Self {
            success: true,
            message: "Cotización válida; no se guardó".to_string(),
            quotes_created: 0,
            extracted_data: Some(draft),
            quote: None,
            errors: Vec::new(),
        }
    }

    fn rejected(rejection: ImportRejection) -> Self {
        Self {
            success: false,
            message: rejection.error.summary().to_string(),
            quotes_created: 0,
            extracted_data: rejection.draft,
            quote: None,
            errors: vec![rejection.error.to_string()],
        }
    }

    /// Outcome for an import that broke down outside the acceptance policy.
    pub fn failed(error: &QuoteError) -> Self {
        Self {
            success: false,
            message: format!("Error procesando PDF: {}", error),
            quotes_created: 0,
            extracted_data: None,
            quote: None,
            errors: vec![error.to_string()],
        }
    }
}

/// A document the acceptance policy turned down.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRejection {
    pub error: ImportError,
    /// The draft, when text was extracted at all.
    pub draft: Option<QuoteDraft>,
}

/// Reject drafts without a procedure or a duration.
pub fn validate_draft(draft: &QuoteDraft) -> std::result::Result<(), ImportError> {
    if draft.procedure_name.is_empty() {
        return Err(ImportError::MissingProcedure);
    }
    if draft.surgery_duration_hours == 0 {
        return Err(ImportError::MissingDuration);
    }
    Ok(())
}

/// Turns documents into stored quotes.
pub struct QuoteImporter<P: QuoteParser = QuoteDraftParser> {
    parser: P,
    default_anesthesia_type: String,
    min_text_length: usize,
}

impl QuoteImporter<QuoteDraftParser> {
    /// Importer with the built-in rules and defaults.
    pub fn new() -> Self {
        Self::from_config(&SurgiquoteConfig::default())
    }

    pub fn from_config(config: &SurgiquoteConfig) -> Self {
        let parser = QuoteDraftParser::new()
            .with_vocabulary(KeywordVocabulary::from_config(&config.extraction));

        Self {
            parser,
            default_anesthesia_type: config.extraction.default_anesthesia_type.clone(),
            min_text_length: config.pdf.min_text_length,
        }
    }
}

impl Default for QuoteImporter<QuoteDraftParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: QuoteParser> QuoteImporter<P> {
    /// Importer around a custom parser.
    pub fn with_parser(parser: P) -> Self {
        let defaults = SurgiquoteConfig::default();
        Self {
            parser,
            default_anesthesia_type: defaults.extraction.default_anesthesia_type,
            min_text_length: defaults.pdf.min_text_length,
        }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Run the parser and the acceptance policy, without storing anything.
    ///
    /// On acceptance the returned draft already carries the default
    /// anesthesia type when none was found.
    pub fn prepare(
        &self,
        text: &str,
    ) -> std::result::Result<(QuoteDraft, QuoteInput), ImportRejection> {
        if text.trim().chars().count() < self.min_text_length.max(1) {
            return Err(ImportRejection {
                error: ImportError::NoText,
                draft: None,
            });
        }

        let mut draft = self.parser.parse(text).draft;

        if let Err(error) = validate_draft(&draft) {
            return Err(ImportRejection {
                error,
                draft: Some(draft),
            });
        }

        if draft.anesthesia_type.is_empty() {
            draft.anesthesia_type = self.default_anesthesia_type.clone();
        }

        let input = QuoteInput::from(draft.clone());
        Ok((draft, input))
    }

    /// Check a document's text without storing it.
    pub fn preview(&self, text: &str) -> ImportOutcome {
        match self.prepare(text) {
            Ok((draft, _)) => ImportOutcome::previewed(draft),
            Err(rejection) => ImportOutcome::rejected(rejection),
        }
    }

    /// Import a document's text into `store`.
    ///
    /// A rejected document is a successful call with an unsuccessful
    /// outcome; only storage failures are errors.
    pub fn import_text(&self, text: &str, store: &QuoteStore) -> Result<ImportOutcome> {
        match self.prepare(text) {
            Ok((draft, input)) => {
                let quote = store.create(input)?;
                info!("Imported quote {} for {}", quote.id, quote.procedure_name);
                Ok(ImportOutcome::created(draft, quote))
            }
            Err(rejection) => {
                warn!("Document rejected: {}", rejection.error);
                Ok(ImportOutcome::rejected(rejection))
            }
        }
    }

    /// Import a PDF document into `store`.
    pub fn import_pdf(&self, data: &[u8], store: &QuoteStore) -> Result<ImportOutcome> {
        let text = extract_document_text(data);
        self.import_text(&text, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::QuoteStatus;
    use crate::pdf::fixtures::single_page_pdf;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const GOOD: &str = "Procedimiento: Hernioplastia inguinal derecha. Duración: 2 horas. \
                        Cirujano: Dr. Esteban Ríos. Total: $18,000";

    #[test]
    fn test_import_creates_quote() {
        let store = QuoteStore::open_in_memory().unwrap();
        let outcome = QuoteImporter::new().import_text(GOOD, &store).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Cotización creada exitosamente desde PDF");
        assert_eq!(outcome.quotes_created, 1);

        let quote = outcome.quote.unwrap();
        assert_eq!(quote.procedure_name, "Hernioplastia inguinal derecha");
        assert_eq!(quote.anesthesia_type, "Anestesia General");
        assert_eq!(quote.surgeon_name.as_deref(), Some("Esteban Ríos"));
        assert_eq!(quote.total_cost, Decimal::new(18_000, 0));
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(store.count().unwrap(), 1);

        let draft = outcome.extracted_data.unwrap();
        assert_eq!(draft.anesthesia_type, "Anestesia General");
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let store = QuoteStore::open_in_memory().unwrap();
        let outcome = QuoteImporter::new().import_text("  \n ", &store).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "No se pudo extraer texto del PDF");
        assert_eq!(outcome.errors, vec!["PDF vacío o no se pudo procesar"]);
        assert!(outcome.extracted_data.is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_missing_procedure_is_rejected() {
        let store = QuoteStore::open_in_memory().unwrap();
        let outcome = QuoteImporter::new()
            .import_text("Duración: 3 horas. Total: $1,000", &store)
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Información insuficiente en el PDF");
        assert_eq!(outcome.errors, vec!["No se pudo identificar el procedimiento"]);
        assert!(outcome.extracted_data.is_some());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_missing_duration_is_rejected() {
        let importer = QuoteImporter::new();
        let rejection = importer
            .prepare("Procedimiento: Colecistectomía laparoscópica")
            .unwrap_err();
        assert_eq!(rejection.error, ImportError::MissingDuration);
    }

    #[test]
    fn test_preview_does_not_store() {
        let outcome = QuoteImporter::new().preview(GOOD);
        assert!(outcome.success);
        assert_eq!(outcome.quotes_created, 0);
        assert!(outcome.quote.is_none());
    }

    #[test]
    fn test_import_pdf_creates_quote() {
        let store = QuoteStore::open_in_memory().unwrap();
        let pdf = single_page_pdf(
            "Procedimiento: Hernioplastia inguinal. Duration: 2 hours. Total: $9,000",
        );
        let outcome = QuoteImporter::new().import_pdf(&pdf, &store).unwrap();

        assert!(outcome.success, "{:?}", outcome.errors);
        assert_eq!(outcome.quotes_created, 1);

        let quote = outcome.quote.unwrap();
        assert_eq!(quote.procedure_name, "Hernioplastia inguinal");
        assert_eq!(quote.surgery_duration_hours, 2);
        assert_eq!(quote.facility_fee, Decimal::new(5_400, 0));
        assert_eq!(quote.total_cost, Decimal::new(9_000, 0));
        assert_eq!(store.get(&quote.id).unwrap(), Some(quote));
    }

    #[test]
    fn test_garbage_pdf_is_rejected() {
        let store = QuoteStore::open_in_memory().unwrap();
        let outcome = QuoteImporter::new().import_pdf(b"%PDF-broken", &store).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.errors, vec!["PDF vacío o no se pudo procesar"]);
    }

    #[test]
    fn test_configured_default_anesthesia() {
        let mut config = SurgiquoteConfig::default();
        config.extraction.default_anesthesia_type = "Sedación".to_string();

        let (draft, input) = QuoteImporter::from_config(&config).prepare(GOOD).unwrap();
        assert_eq!(draft.anesthesia_type, "Sedación");
        assert_eq!(input.anesthesia_type, "Sedación");
    }

    #[test]
    fn test_validate_draft_order() {
        assert_eq!(
            validate_draft(&QuoteDraft::default()),
            Err(ImportError::MissingProcedure)
        );
    }
}
