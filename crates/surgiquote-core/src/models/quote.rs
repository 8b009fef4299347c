//! Surgical quote data models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// `created_by` tag stamped on every document-derived draft.
pub const IMPORT_CREATED_BY: &str = "Importación PDF";

/// `notes` tag stamped on every document-derived draft.
pub const IMPORT_NOTES: &str = "Cotización importada desde PDF";

/// Bundle of services included with a surgery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgicalPackage {
    /// Medications covered by the quote.
    pub medications_included: Vec<String>,

    /// Post-operative care items.
    pub postoperative_care: Vec<String>,

    /// Nights of hospital stay covered by the package.
    pub hospital_stay_nights: u32,

    /// Special equipment covered by the package.
    pub special_equipment: Vec<String>,

    /// Whether a dietary plan is included.
    pub dietary_plan: bool,

    /// Any other included services.
    pub additional_services: Vec<String>,
}

/// Workflow status of a stored quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteStatus {
    /// Draft (borrador).
    #[default]
    #[serde(rename = "borrador")]
    Draft,
    /// Approved (aprobado).
    #[serde(rename = "aprobado")]
    Approved,
    /// Rejected (rechazado).
    #[serde(rename = "rechazado")]
    Rejected,
}

impl QuoteStatus {
    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "borrador",
            QuoteStatus::Approved => "aprobado",
            QuoteStatus::Rejected => "rechazado",
        }
    }

    /// Parse a status, accepting the Spanish wire names and English aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "borrador" | "draft" => Some(QuoteStatus::Draft),
            "aprobado" | "aprobada" | "approved" => Some(QuoteStatus::Approved),
            "rechazado" | "rechazada" | "rejected" => Some(QuoteStatus::Rejected),
            _ => None,
        }
    }
}

/// A quote draft produced by document extraction.
///
/// Every field is always populated: either with an extracted value or with
/// its fixed default. Drafts carry no identity; the store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub patient_id: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,

    pub procedure_name: String,
    pub procedure_code: Option<String>,
    pub procedure_description: Option<String>,

    pub surgeon_name: String,
    pub surgeon_specialty: Option<String>,

    pub facility_fee: Decimal,
    pub equipment_costs: Decimal,
    pub anesthesia_fee: Decimal,
    pub other_costs: Decimal,
    pub total_cost: Decimal,

    pub surgery_duration_hours: u32,
    pub anesthesia_type: String,
    pub additional_equipment: Vec<String>,
    pub additional_materials: Vec<String>,
    pub is_ambulatory: bool,
    pub hospital_nights: u32,

    pub created_by: String,
    pub notes: String,
    pub surgical_package: SurgicalPackage,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            patient_id: None,
            patient_age: None,
            patient_phone: None,
            patient_email: None,
            procedure_name: String::new(),
            procedure_code: None,
            procedure_description: None,
            surgeon_name: String::new(),
            surgeon_specialty: None,
            facility_fee: Decimal::ZERO,
            equipment_costs: Decimal::ZERO,
            anesthesia_fee: Decimal::ZERO,
            other_costs: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            surgery_duration_hours: 0,
            anesthesia_type: String::new(),
            additional_equipment: Vec::new(),
            additional_materials: Vec::new(),
            is_ambulatory: true,
            hospital_nights: 0,
            created_by: IMPORT_CREATED_BY.to_string(),
            notes: IMPORT_NOTES.to_string(),
            surgical_package: SurgicalPackage::default(),
        }
    }
}

/// Payload for creating or replacing a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteInput {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_age: Option<u32>,
    #[serde(default)]
    pub patient_phone: Option<String>,
    #[serde(default)]
    pub patient_email: Option<String>,

    pub procedure_name: String,
    #[serde(default)]
    pub procedure_code: Option<String>,
    #[serde(default)]
    pub procedure_description: Option<String>,

    #[serde(default)]
    pub surgeon_name: Option<String>,
    #[serde(default)]
    pub surgeon_specialty: Option<String>,

    pub surgery_duration_hours: u32,
    pub anesthesia_type: String,
    #[serde(default)]
    pub additional_equipment: Vec<String>,
    #[serde(default)]
    pub additional_materials: Vec<String>,
    #[serde(default = "default_ambulatory")]
    pub is_ambulatory: bool,
    #[serde(default)]
    pub hospital_nights: u32,

    pub facility_fee: Decimal,
    pub equipment_costs: Decimal,
    #[serde(default)]
    pub anesthesia_fee: Decimal,
    #[serde(default)]
    pub other_costs: Decimal,

    #[serde(default)]
    pub surgical_package: Option<SurgicalPackage>,

    pub created_by: String,
    /// Omitted on create means draft; omitted on update keeps the stored status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QuoteStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_ambulatory() -> bool {
    true
}

impl QuoteInput {
    /// Total cost: facility + equipment + anesthesia + other.
    pub fn total_cost(&self) -> Decimal {
        sum_costs(&[
            self.facility_fee,
            self.equipment_costs,
            self.anesthesia_fee,
            self.other_costs,
        ])
    }

    /// Check the payload before it is persisted.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.procedure_name.trim().is_empty() {
            return Err(invalid("procedure_name", "must not be empty"));
        }
        if self.created_by.trim().is_empty() {
            return Err(invalid("created_by", "must not be empty"));
        }

        let fees = [
            ("facility_fee", self.facility_fee),
            ("equipment_costs", self.equipment_costs),
            ("anesthesia_fee", self.anesthesia_fee),
            ("other_costs", self.other_costs),
        ];
        for (field, value) in fees {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(invalid(field, "must not be negative"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> QuoteError {
    QuoteError::Validation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl From<QuoteDraft> for QuoteInput {
    fn from(draft: QuoteDraft) -> Self {
        let surgeon_name = Some(draft.surgeon_name).filter(|name| !name.is_empty());

        Self {
            patient_id: draft.patient_id,
            patient_age: draft.patient_age,
            patient_phone: draft.patient_phone,
            patient_email: draft.patient_email,
            procedure_name: draft.procedure_name,
            procedure_code: draft.procedure_code,
            procedure_description: draft.procedure_description,
            surgeon_name,
            surgeon_specialty: draft.surgeon_specialty,
            surgery_duration_hours: draft.surgery_duration_hours,
            anesthesia_type: draft.anesthesia_type,
            additional_equipment: draft.additional_equipment,
            additional_materials: draft.additional_materials,
            is_ambulatory: draft.is_ambulatory,
            hospital_nights: draft.hospital_nights,
            facility_fee: draft.facility_fee,
            equipment_costs: draft.equipment_costs,
            anesthesia_fee: draft.anesthesia_fee,
            other_costs: draft.other_costs,
            surgical_package: Some(draft.surgical_package),
            created_by: draft.created_by,
            status: None,
            notes: Some(draft.notes),
        }
    }
}

/// A persisted quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier (UUID v4).
    pub id: String,

    // Patient
    pub patient_id: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,

    // Procedure
    pub procedure_name: String,
    pub procedure_code: Option<String>,
    pub procedure_description: Option<String>,

    // Surgeon
    pub surgeon_name: Option<String>,
    pub surgeon_specialty: Option<String>,

    // Surgery details
    pub surgery_duration_hours: u32,
    pub anesthesia_type: String,
    pub additional_equipment: Vec<String>,
    pub additional_materials: Vec<String>,
    pub is_ambulatory: bool,
    pub hospital_nights: u32,

    // Costs
    pub facility_fee: Decimal,
    pub equipment_costs: Decimal,
    pub anesthesia_fee: Decimal,
    pub other_costs: Decimal,
    pub total_cost: Decimal,

    pub surgical_package: Option<SurgicalPackage>,

    // Metadata
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub status: QuoteStatus,
    pub notes: Option<String>,
}

impl Quote {
    /// Build a stored quote from a payload; `total_cost` is always recomputed.
    pub fn from_input(id: String, created_at: DateTime<Utc>, input: QuoteInput) -> Self {
        let total_cost = input.total_cost();

        Self {
            id,
            patient_id: input.patient_id,
            patient_age: input.patient_age,
            patient_phone: input.patient_phone,
            patient_email: input.patient_email,
            procedure_name: input.procedure_name,
            procedure_code: input.procedure_code,
            procedure_description: input.procedure_description,
            surgeon_name: input.surgeon_name,
            surgeon_specialty: input.surgeon_specialty,
            surgery_duration_hours: input.surgery_duration_hours,
            anesthesia_type: input.anesthesia_type,
            additional_equipment: input.additional_equipment,
            additional_materials: input.additional_materials,
            is_ambulatory: input.is_ambulatory,
            hospital_nights: input.hospital_nights,
            facility_fee: input.facility_fee,
            equipment_costs: input.equipment_costs,
            anesthesia_fee: input.anesthesia_fee,
            other_costs: input.other_costs,
            total_cost,
            surgical_package: input.surgical_package,
            created_at,
            created_by: input.created_by,
            status: input.status.unwrap_or_default(),
            notes: input.notes,
        }
    }
}

/// Sum cost components, or `None` when the sum overflows.
pub fn checked_sum_costs(values: &[Decimal]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))
}

/// Sum cost components, capped at `Decimal::MAX`.
pub fn sum_costs(values: &[Decimal]) -> Decimal {
    checked_sum_costs(values).unwrap_or(Decimal::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input() -> QuoteInput {
        QuoteInput {
            patient_id: Some("EXP-1001".to_string()),
            patient_age: Some(42),
            patient_phone: None,
            patient_email: None,
            procedure_name: "Colecistectomía laparoscópica".to_string(),
            procedure_code: None,
            procedure_description: None,
            surgeon_name: Some("Laura Méndez".to_string()),
            surgeon_specialty: None,
            surgery_duration_hours: 2,
            anesthesia_type: "Anestesia general".to_string(),
            additional_equipment: vec![],
            additional_materials: vec![],
            is_ambulatory: false,
            hospital_nights: 1,
            facility_fee: Decimal::new(25_000, 0),
            equipment_costs: Decimal::new(8_000, 0),
            anesthesia_fee: Decimal::new(4_500, 0),
            other_costs: Decimal::new(1_250, 1),
            surgical_package: None,
            created_by: "recepcion".to_string(),
            status: None,
            notes: None,
        }
    }

    #[test]
    fn test_total_cost_sums_all_components() {
        assert_eq!(input().total_cost(), Decimal::new(376_250, 1));
    }

    #[test]
    fn test_validate_rejects_empty_procedure() {
        let mut quote = input();
        quote.procedure_name = "  ".to_string();
        assert!(matches!(
            quote.validate(),
            Err(QuoteError::Validation { field, .. }) if field == "procedure_name"
        ));
    }

    #[test]
    fn test_validate_rejects_negative_fee() {
        let mut quote = input();
        quote.equipment_costs = Decimal::new(-1, 0);
        assert!(quote.validate().is_err());
    }

    #[test]
    fn test_from_input_defaults_status_to_draft() {
        let quote = Quote::from_input("q-1".to_string(), Utc::now(), input());
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.total_cost, Decimal::new(376_250, 1));
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        assert_eq!(
            checked_sum_costs(&[Decimal::new(15, 1), Decimal::ONE]),
            Some(Decimal::new(25, 1))
        );
        assert_eq!(checked_sum_costs(&[Decimal::MAX, Decimal::MAX]), None);
        assert_eq!(sum_costs(&[Decimal::MAX, Decimal::ONE]), Decimal::MAX);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(QuoteStatus::parse("Borrador"), Some(QuoteStatus::Draft));
        assert_eq!(QuoteStatus::parse("approved"), Some(QuoteStatus::Approved));
        assert_eq!(QuoteStatus::parse("rechazada"), Some(QuoteStatus::Rejected));
        assert_eq!(QuoteStatus::parse("pendiente"), None);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&QuoteStatus::Approved).unwrap();
        assert_eq!(json, "\"aprobado\"");
    }

    #[test]
    fn test_draft_to_input_drops_empty_surgeon() {
        let draft = QuoteDraft {
            procedure_name: "Artroscopia de rodilla".to_string(),
            surgery_duration_hours: 1,
            ..QuoteDraft::default()
        };
        let input = QuoteInput::from(draft);
        assert_eq!(input.surgeon_name, None);
        assert_eq!(input.created_by, IMPORT_CREATED_BY);
        assert_eq!(input.notes.as_deref(), Some(IMPORT_NOTES));
    }
}
