//! Aggregate reports over stored quotes.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::StoreError;
use crate::models::quote::{Quote, sum_costs};
use crate::models::report::{DashboardStats, PricingSuggestion};
use crate::store::{QuoteFilter, QuoteStore};

/// Quotes shown in the dashboard's recent list.
pub const DASHBOARD_RECENT: usize = 5;

/// Procedures shown in the dashboard's leaderboard.
pub const DASHBOARD_TOP: usize = 5;

/// Historical averages for quotes whose procedure contains `procedure`.
///
/// Averages are rounded to two decimals; with no matching quote every
/// figure is zero.
pub fn pricing_suggestion(
    store: &QuoteStore,
    procedure: &str,
) -> Result<PricingSuggestion, StoreError> {
    let quotes = store.list(&QuoteFilter::procedure(procedure))?;
    debug!("Pricing {:?} from {} quotes", procedure, quotes.len());
    Ok(suggest_from(procedure, &quotes))
}

fn suggest_from(procedure: &str, quotes: &[Quote]) -> PricingSuggestion {
    if quotes.is_empty() {
        return PricingSuggestion::empty(procedure);
    }

    let average = |pick: fn(&Quote) -> Decimal| {
        let values: Vec<Decimal> = quotes.iter().map(pick).collect();
        (sum_costs(&values) / Decimal::from(quotes.len())).round_dp(2)
    };

    let avg_total_cost = average(|q| q.total_cost);

    PricingSuggestion {
        procedure_name: procedure.to_string(),
        avg_facility_fee: average(|q| q.facility_fee),
        avg_equipment_costs: average(|q| q.equipment_costs),
        avg_total_cost,
        quote_count: quotes.len(),
        suggested_total: avg_total_cost,
    }
}

/// Quote count, most recent quotes and most quoted procedures.
pub fn dashboard(store: &QuoteStore) -> Result<DashboardStats, StoreError> {
    Ok(DashboardStats {
        total_quotes: store.count()?,
        recent_quotes: store.recent(DASHBOARD_RECENT)?,
        top_procedures: store.top_procedures(DASHBOARD_TOP)?,
    })
}
