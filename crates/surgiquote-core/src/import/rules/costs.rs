//! Cost component extraction.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{ANESTHESIA_FEE, EQUIPMENT_COSTS, FACILITY_FEE, TOTAL_COST};
use super::{ExtractionMatch, FieldExtractor, first_match};

/// A cost figure the extractor knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostField {
    Facility,
    Equipment,
    Anesthesia,
    /// Aggregate total, used only for reconciliation.
    Total,
}

impl CostField {
    /// Draft field name.
    pub fn name(&self) -> &'static str {
        match self {
            CostField::Facility => "facility_fee",
            CostField::Equipment => "equipment_costs",
            CostField::Anesthesia => "anesthesia_fee",
            CostField::Total => "total_cost",
        }
    }

    fn patterns(&self) -> &'static [Regex] {
        match self {
            CostField::Facility => &FACILITY_FEE,
            CostField::Equipment => &EQUIPMENT_COSTS,
            CostField::Anesthesia => &ANESTHESIA_FEE,
            CostField::Total => &TOTAL_COST,
        }
    }
}

/// Extractor for one cost figure.
pub struct CostExtractor {
    field: CostField,
}

impl CostExtractor {
    pub fn new(field: CostField) -> Self {
        Self { field }
    }
}

impl FieldExtractor for CostExtractor {
    type Output = Decimal;

    fn field(&self) -> &'static str {
        self.field.name()
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        first_match(self.field.patterns(), text, |caps| parse_amount(caps.get(1)?.as_str()))
    }
}

/// Cost figures found in a document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedCosts {
    pub facility_fee: Option<ExtractionMatch<Decimal>>,
    pub equipment_costs: Option<ExtractionMatch<Decimal>>,
    pub anesthesia_fee: Option<ExtractionMatch<Decimal>>,
    pub total: Option<ExtractionMatch<Decimal>>,
}

/// Extract every cost figure independently.
pub fn extract_costs(text: &str) -> ExtractedCosts {
    let find = |field| CostExtractor::new(field).extract(text);

    ExtractedCosts {
        facility_fee: find(CostField::Facility),
        equipment_costs: find(CostField::Equipment),
        anesthesia_fee: find(CostField::Anesthesia),
        total: find(CostField::Total),
    }
}

/// Parse an amount such as `$12,500.00`.
///
/// The currency sign and thousands separators are dropped. Anything that
/// is still not a number yields `None`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim().trim_end_matches('.');

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(cleaned).ok()
}
