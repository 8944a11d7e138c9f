use crate::domain::shipment::{Shipment, ShipmentCategory};
use crate::error::{Result, RuleError};
use rust_decimal::Decimal;
use serde::Serialize;

/// Sum of at most one fragile and one priority shipment.
///
/// A missing side contributes zero. Each side contributes the total its
/// shipment already carries, so the sum never uses different rates than the
/// shipments themselves. [`ShipmentGrandTotal::recompute`] refreshes the sums
/// after a referenced shipment changes.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct ShipmentGrandTotal {
    pub fragile: Option<Shipment>,
    pub priority: Option<Shipment>,
    pub fragile_total: Decimal,
    pub priority_total: Decimal,
    pub grand_total: Decimal,
}

impl ShipmentGrandTotal {
    pub fn new(fragile: Option<Shipment>, priority: Option<Shipment>) -> Result<Self> {
        expect_category(fragile.as_ref(), ShipmentCategory::Fragile)?;
        expect_category(priority.as_ref(), ShipmentCategory::Priority)?;

        let mut totals = Self {
            fragile,
            priority,
            fragile_total: Decimal::ZERO,
            priority_total: Decimal::ZERO,
            grand_total: Decimal::ZERO,
        };
        totals.recompute();
        Ok(totals)
    }

    pub fn recompute(&mut self) {
        self.fragile_total = side_cost(self.fragile.as_ref());
        self.priority_total = side_cost(self.priority.as_ref());
        self.grand_total = grand_total(self);
    }
}

fn expect_category(shipment: Option<&Shipment>, expected: ShipmentCategory) -> Result<()> {
    match shipment {
        Some(s) if s.category() != expected => Err(RuleError::InvalidShipment(format!(
            "shipment {} is {}, expected {}",
            s.id,
            s.category(),
            expected
        ))),
        _ => Ok(()),
    }
}

fn side_cost(shipment: Option<&Shipment>) -> Decimal {
    shipment.map_or(Decimal::ZERO, Shipment::total_cost)
}

pub fn grand_total(agg: &ShipmentGrandTotal) -> Decimal {
    side_cost(agg.fragile.as_ref()) + side_cost(agg.priority.as_ref())
}
