//! Aggregate report models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quote::Quote;

/// Historical pricing for quotes whose procedure matches a search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSuggestion {
    pub procedure_name: String,
    pub avg_facility_fee: Decimal,
    pub avg_equipment_costs: Decimal,
    pub avg_total_cost: Decimal,
    pub quote_count: usize,
    pub suggested_total: Decimal,
}

impl PricingSuggestion {
    /// Suggestion with no history behind it.
    pub fn empty(procedure_name: &str) -> Self {
        Self {
            procedure_name: procedure_name.to_string(),
            avg_facility_fee: Decimal::ZERO,
            avg_equipment_costs: Decimal::ZERO,
            avg_total_cost: Decimal::ZERO,
            quote_count: 0,
            suggested_total: Decimal::ZERO,
        }
    }
}

/// A procedure name and how many quotes use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureCount {
    pub name: String,
    pub count: usize,
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_quotes: usize,
    pub recent_quotes: Vec<Quote>,
    pub top_procedures: Vec<ProcedureCount>,
}
