use crate::domain::grand_total::ShipmentGrandTotal;
use crate::domain::loyalty::{DiscountTier, LoyaltyAnalysis};
use crate::domain::shipment::{Shipment, ShipmentCategory};
use crate::domain::transaction::TransactionStatus;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TransactionRow {
    date: NaiveDate,
    amount: Decimal,
    status: TransactionStatus,
}

#[derive(Serialize)]
struct AnalysisRow<'a> {
    name: &'a str,
    total_points: u32,
    max_discount: DiscountTier,
    discount_percent: u8,
    high_value_count: u32,
    failed_count: usize,
}

#[derive(Serialize)]
struct ShipmentRow<'a> {
    identifier: &'a str,
    category: ShipmentCategory,
    distance_km: u32,
    total_cost: Decimal,
    insurance_cost: Option<Decimal>,
}

#[derive(Serialize)]
struct GrandTotalRow {
    fragile_total: Decimal,
    priority_total: Decimal,
    grand_total: Decimal,
}

/// Writes analyses, shipments and grand totals as CSV.
///
/// Each `write_*` call emits its own header row followed by the records and
/// flushes, so several sections can share one output stream.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn section(&mut self) -> csv::Writer<&mut W> {
        csv::WriterBuilder::new().from_writer(&mut self.out)
    }

    pub fn write_transactions(&mut self, analysis: &LoyaltyAnalysis) -> Result<()> {
        let mut wtr = self.section();
        for tx in &analysis.transactions {
            wtr.serialize(TransactionRow {
                date: tx.date,
                amount: tx.amount.normalize(),
                status: tx.status,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_analysis(&mut self, analysis: &LoyaltyAnalysis) -> Result<()> {
        let mut wtr = self.section();
        wtr.serialize(AnalysisRow {
            name: &analysis.name,
            total_points: analysis.total_points,
            max_discount: analysis.max_discount,
            discount_percent: analysis.max_discount.discount_percent(),
            high_value_count: analysis.high_value_count,
            failed_count: analysis.failed_count(),
        })?;
        wtr.flush()?;
        Ok(())
    }

    pub fn write_shipments(&mut self, shipments: &[Shipment]) -> Result<()> {
        let mut wtr = self.section();
        for shipment in shipments {
            wtr.serialize(ShipmentRow {
                identifier: shipment.identifier.as_deref().unwrap_or(""),
                category: shipment.category(),
                distance_km: shipment.distance().value(),
                total_cost: shipment.total_cost().normalize(),
                insurance_cost: shipment.insurance_cost().map(|c| c.normalize()),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_grand_total(&mut self, totals: &ShipmentGrandTotal) -> Result<()> {
        let mut wtr = self.section();
        wtr.serialize(GrandTotalRow {
            fragile_total: totals.fragile_total.normalize(),
            priority_total: totals.priority_total.normalize(),
            grand_total: totals.grand_total.normalize(),
        })?;
        wtr.flush()?;
        Ok(())
    }
}
