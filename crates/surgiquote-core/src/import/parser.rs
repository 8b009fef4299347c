//! Draft assembly from document text.

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::models::quote::QuoteDraft;

use super::QuoteParser;
use super::normalize::normalize_text;
use super::reconcile::{CostBreakdown, Reconciliation, reconcile_costs};
use super::rules::{
    CostField, DurationExtractor, ExtractionMatch, FieldExtractor, HospitalStay,
    KeywordVocabulary, ProcedureExtractor, SurgeonExtractor, detect_hospital_stay, extract_anesthesia_type,
    extract_costs, extract_patient_age, extract_patient_email, extract_patient_id,
    extract_patient_phone, match_keywords,
};

/// How a draft field got its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldSource {
    /// Captured by the pattern at this catalog index.
    Matched { pattern: usize, source: String },
    /// Filled from this many vocabulary terms.
    Keywords { count: usize },
    /// Derived from the aggregate total by the 60/30/10 split.
    Split,
    /// Computed from other fields.
    Derived,
    /// Nothing matched; the default was kept.
    Defaulted,
}

/// Result of draft extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// The assembled draft.
    pub draft: QuoteDraft,
    /// Text the patterns ran against.
    pub normalized_text: String,
    /// Provenance of every rule-backed field.
    pub fields: BTreeMap<&'static str, FieldSource>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Names of rule-backed fields left at their default.
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(_, source)| **source == FieldSource::Defaulted)
            .map(|(field, _)| *field)
            .collect()
    }
}

/// Rule-based quote draft parser.
#[derive(Debug, Clone, Default)]
pub struct QuoteDraftParser {
    vocabulary: KeywordVocabulary,
}

impl QuoteDraftParser {
    /// Create a parser with the built-in vocabularies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keyword vocabularies.
    pub fn with_vocabulary(mut self, vocabulary: KeywordVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn vocabulary(&self) -> &KeywordVocabulary {
        &self.vocabulary
    }
}

/// Record where a field came from and hand back its value.
fn record<T>(
    fields: &mut BTreeMap<&'static str, FieldSource>,
    field: &'static str,
    found: Option<ExtractionMatch<T>>,
) -> Option<T> {
    match found {
        Some(m) => {
            fields.insert(
                field,
                FieldSource::Matched {
                    pattern: m.pattern,
                    source: m.source,
                },
            );
            Some(m.value)
        }
        None => {
            fields.insert(field, FieldSource::Defaulted);
            None
        }
    }
}

fn record_keywords(
    fields: &mut BTreeMap<&'static str, FieldSource>,
    field: &'static str,
    found: &[String],
) {
    let source = if found.is_empty() {
        FieldSource::Defaulted
    } else {
        FieldSource::Keywords { count: found.len() }
    };
    fields.insert(field, source);
}

impl QuoteParser for QuoteDraftParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let text = normalize_text(text);
        let mut fields = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut draft = QuoteDraft::default();

        debug!("Extracting quote draft from {} characters", text.len());

        // Patient
        draft.patient_id = record(&mut fields, "patient_id", extract_patient_id(&text));
        draft.patient_age = record(&mut fields, "patient_age", extract_patient_age(&text));
        draft.patient_phone = record(&mut fields, "patient_phone", extract_patient_phone(&text));
        draft.patient_email = record(&mut fields, "patient_email", extract_patient_email(&text));

        // Procedure
        let procedure = ProcedureExtractor::new();
        draft.procedure_name =
            record(&mut fields, procedure.field(), procedure.extract(&text)).unwrap_or_default();
        if draft.procedure_name.is_empty() {
            warnings.push("Could not identify the procedure".to_string());
        }

        let surgeon = SurgeonExtractor::new();
        draft.surgeon_name =
            record(&mut fields, surgeon.field(), surgeon.extract(&text)).unwrap_or_default();

        let duration = DurationExtractor::new();
        draft.surgery_duration_hours =
            record(&mut fields, duration.field(), duration.extract(&text)).unwrap_or_default();
        if draft.surgery_duration_hours == 0 {
            warnings.push("Could not identify the surgery duration in hours".to_string());
        }

        draft.anesthesia_type =
            record(&mut fields, "anesthesia_type", extract_anesthesia_type(&text))
                .unwrap_or_default();

        // Costs
        let costs = extract_costs(&text);
        let found = CostBreakdown {
            facility_fee: record(&mut fields, CostField::Facility.name(), costs.facility_fee)
                .unwrap_or_default(),
            equipment_costs: record(&mut fields, CostField::Equipment.name(), costs.equipment_costs)
                .unwrap_or_default(),
            anesthesia_fee: record(&mut fields, CostField::Anesthesia.name(), costs.anesthesia_fee)
                .unwrap_or_default(),
            other_costs: Decimal::ZERO,
        };
        let stated_total = costs.total.map(|m| m.value).unwrap_or_default();

        let (breakdown, reconciliation) = reconcile_costs(found, stated_total);
        if reconciliation == Reconciliation::Split {
            debug!("Splitting stated total {} across cost components", stated_total);
            for field in [CostField::Facility, CostField::Equipment, CostField::Anesthesia] {
                fields.insert(field.name(), FieldSource::Split);
            }
        }

        draft.facility_fee = breakdown.facility_fee;
        draft.equipment_costs = breakdown.equipment_costs;
        draft.anesthesia_fee = breakdown.anesthesia_fee;
        draft.other_costs = breakdown.other_costs;
        draft.total_cost = match breakdown.checked_total() {
            Some(total) => total,
            None => {
                warnings.push(format!(
                    "Sum of cost components overflows; total capped at {}",
                    Decimal::MAX
                ));
                Decimal::MAX
            }
        };
        fields.insert(CostField::Total.name(), FieldSource::Derived);

        if reconciliation == Reconciliation::Direct
            && !stated_total.is_zero()
            && stated_total != draft.total_cost
        {
            warnings.push(format!(
                "Stated total {} differs from the sum of cost components {}",
                stated_total, draft.total_cost
            ));
        }

        // Keyword presence
        draft.surgical_package.medications_included =
            match_keywords(&text, &self.vocabulary.medications);
        record_keywords(
            &mut fields,
            "medications_included",
            &draft.surgical_package.medications_included,
        );

        draft.additional_equipment = match_keywords(&text, &self.vocabulary.equipment);
        record_keywords(&mut fields, "additional_equipment", &draft.additional_equipment);

        // Hospital stay
        let stay = record(&mut fields, "hospital_stay", detect_hospital_stay(&text))
            .unwrap_or(HospitalStay::Undetermined);
        draft.is_ambulatory = stay.is_ambulatory();
        draft.hospital_nights = stay.nights();

        debug!(
            "Draft extracted: procedure={:?}, duration={}h, total={}",
            draft.procedure_name, draft.surgery_duration_hours, draft.total_cost
        );

        ExtractionResult {
            draft,
            normalized_text: text,
            fields,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract a quote draft from raw document text with the built-in rules.
///
/// Never fails: an unreadable or empty text gives an all-defaults draft.
pub fn extract_draft(text: &str) -> QuoteDraft {
    QuoteDraftParser::new().parse(text).draft
}
