use crate::domain::shipment::ShipmentCategory;
use crate::error::{Result, RuleError};
use serde::Deserialize;
use std::io::Read;

/// A raw shipment row as read from CSV.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ShipmentRecord {
    pub category: ShipmentCategory,
    pub distance_km: Option<i64>,
    pub identifier: Option<String>,
}

/// A shipment request with every required column present, ready for
/// validation and numbering by the engine.
#[derive(Debug, PartialEq, Clone)]
pub struct ShipmentRequest {
    pub category: ShipmentCategory,
    pub distance_km: i64,
    pub identifier: Option<String>,
}

impl TryFrom<ShipmentRecord> for ShipmentRequest {
    type Error = RuleError;

    fn try_from(record: ShipmentRecord) -> std::result::Result<Self, Self::Error> {
        let distance_km = record
            .distance_km
            .ok_or_else(|| RuleError::InvalidShipment("missing distance_km".to_string()))?;
        Ok(Self {
            category: record.category,
            distance_km,
            identifier: record.identifier,
        })
    }
}

/// Reads shipment requests from a CSV source with
/// `category, distance_km, identifier` columns.
pub struct ShipmentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ShipmentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn shipments(self) -> impl Iterator<Item = Result<ShipmentRequest>> {
        self.reader.into_deserialize().map(|result| -> Result<ShipmentRequest> {
            let record: ShipmentRecord = result.map_err(RuleError::from)?;
            ShipmentRequest::try_from(record)
        })
    }
}
