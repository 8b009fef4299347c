//! Cost reconciliation.

use rust_decimal::Decimal;

use crate::models::quote::{checked_sum_costs, sum_costs};

/// Cost components after reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostBreakdown {
    pub facility_fee: Decimal,
    pub equipment_costs: Decimal,
    pub anesthesia_fee: Decimal,
    pub other_costs: Decimal,
}

impl CostBreakdown {
    /// facility + equipment + anesthesia + other.
    pub fn total(&self) -> Decimal {
        sum_costs(&[
            self.facility_fee,
            self.equipment_costs,
            self.anesthesia_fee,
            self.other_costs,
        ])
    }

    /// Like [`total`](Self::total), but `None` when the sum overflows.
    pub fn checked_total(&self) -> Option<Decimal> {
        checked_sum_costs(&[
            self.facility_fee,
            self.equipment_costs,
            self.anesthesia_fee,
            self.other_costs,
        ])
    }

    fn direct_sum(&self) -> Decimal {
        sum_costs(&[self.facility_fee, self.equipment_costs, self.anesthesia_fee])
    }
}

/// Whether the aggregate total had to be split across the components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Components were kept as found.
    Direct,
    /// Components were derived 60/30/10 from the aggregate total.
    Split,
}

/// Fill in cost components from the aggregate total when none were found.
///
/// With no direct component and a positive `total`, the total is split
/// 60% facility, 30% equipment, 10% anesthesia. The shares are exact, so
/// they always sum back to `total`.
pub fn reconcile_costs(found: CostBreakdown, total: Decimal) -> (CostBreakdown, Reconciliation) {
    if !found.direct_sum().is_zero() || total <= Decimal::ZERO {
        return (found, Reconciliation::Direct);
    }

    let split = CostBreakdown {
        facility_fee: total * Decimal::new(6, 1),
        equipment_costs: total * Decimal::new(3, 1),
        anesthesia_fee: total * Decimal::new(1, 1),
        other_costs: found.other_costs,
    };

    (split, Reconciliation::Split)
}
