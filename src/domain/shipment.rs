use crate::error::{Result, RuleError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier placeholder meaning "assign one at creation".
pub const PENDING_IDENTIFIER: &str = "New";

/// Non-negative shipment distance in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DistanceKm(u32);

impl DistanceKm {
    pub fn new(km: i64) -> Result<Self> {
        if km < 0 {
            return Err(RuleError::InvalidShipment(format!(
                "distance must not be negative, got {km} km"
            )));
        }
        u32::try_from(km).map(Self).map_err(|_| {
            RuleError::InvalidShipment(format!("distance of {km} km is out of range"))
        })
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for DistanceKm {
    type Error = RuleError;

    fn try_from(km: i64) -> std::result::Result<Self, Self::Error> {
        Self::new(km)
    }
}

impl From<DistanceKm> for Decimal {
    fn from(distance: DistanceKm) -> Self {
        Decimal::from(distance.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentCategory {
    Standard,
    Fragile,
    Priority,
}

impl ShipmentCategory {
    /// Sequence used to number shipments of this category, if it is numbered.
    pub fn sequence_code(&self) -> Option<&'static str> {
        match self {
            ShipmentCategory::Standard => None,
            ShipmentCategory::Fragile => Some("shipment.fragile"),
            ShipmentCategory::Priority => Some("shipment.priority"),
        }
    }

    pub fn identifier_prefix(&self) -> Option<&'static str> {
        match self {
            ShipmentCategory::Standard => None,
            ShipmentCategory::Fragile => Some("FRG/"),
            ShipmentCategory::Priority => Some("PRI/"),
        }
    }

    /// Formats the `n`th sequence value as a display identifier, e.g. `FRG/00007`.
    pub fn format_identifier(&self, n: u64) -> Option<String> {
        self.identifier_prefix()
            .map(|prefix| format!("{prefix}{n:05}"))
    }
}

impl fmt::Display for ShipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShipmentCategory::Standard => "standard",
            ShipmentCategory::Fragile => "fragile",
            ShipmentCategory::Priority => "priority",
        };
        f.write_str(name)
    }
}

/// Rates for the layered cost chain.
///
/// Every layer is built from the one beneath it:
/// base -> standard (+ handling) -> fragile (+ markup of standard) or priority (+ fee).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSchedule {
    pub per_km_rate: Decimal,
    pub handling_fee: Decimal,
    /// Fraction of the standard cost added for fragile goods.
    pub fragile_markup: Decimal,
    pub priority_fee: Decimal,
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self {
            per_km_rate: dec!(5000),
            handling_fee: dec!(20000),
            fragile_markup: dec!(0.10),
            priority_fee: dec!(50000),
        }
    }
}

impl CostSchedule {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("per_km_rate", self.per_km_rate),
            ("handling_fee", self.handling_fee),
            ("fragile_markup", self.fragile_markup),
            ("priority_fee", self.priority_fee),
        ];
        match fields.iter().find(|(_, value)| value.is_sign_negative()) {
            Some((name, value)) => Err(RuleError::Config(format!(
                "{name} must not be negative, got {value}"
            ))),
            None => Ok(()),
        }
    }

    pub fn base_cost(&self, distance: DistanceKm) -> Decimal {
        Decimal::from(distance) * self.per_km_rate
    }

    pub fn standard_cost(&self, distance: DistanceKm) -> Decimal {
        self.base_cost(distance) + self.handling_fee
    }

    pub fn fragile_cost(&self, distance: DistanceKm) -> Decimal {
        let standard = self.standard_cost(distance);
        standard + standard * self.fragile_markup
    }

    pub fn priority_cost(&self, distance: DistanceKm) -> Decimal {
        self.standard_cost(distance) + self.priority_fee
    }

    /// The fragile increment over the standard cost.
    pub fn insurance_cost(&self, distance: DistanceKm) -> Decimal {
        self.fragile_cost(distance) - self.standard_cost(distance)
    }

    pub fn total_cost(&self, category: ShipmentCategory, distance: DistanceKm) -> Decimal {
        match category {
            ShipmentCategory::Standard => self.standard_cost(distance),
            ShipmentCategory::Fragile => self.fragile_cost(distance),
            ShipmentCategory::Priority => self.priority_cost(distance),
        }
    }
}

pub fn calculate_base_cost(distance: DistanceKm, schedule: &CostSchedule) -> Decimal {
    schedule.base_cost(distance)
}

/// Total cost of a shipment under `schedule`, dispatched on its category.
///
/// [`Shipment::recompute`] stores exactly this value, so a shipment built with
/// the same schedule always agrees with it.
pub fn calculate_total_cost(shipment: &Shipment, schedule: &CostSchedule) -> Decimal {
    schedule.total_cost(shipment.category, shipment.distance)
}

/// A shipment of exactly one category with its derived costs.
///
/// `category` and `distance` are fixed outside of [`Shipment::set_distance`];
/// `total_cost` and `insurance_cost` are only ever written by
/// [`Shipment::recompute`], which runs on construction and on every distance change.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Shipment {
    pub id: u64,
    category: ShipmentCategory,
    distance: DistanceKm,
    pub identifier: Option<String>,
    total_cost: Decimal,
    insurance_cost: Option<Decimal>,
}

impl Shipment {
    pub fn new(
        id: u64,
        category: ShipmentCategory,
        distance_km: i64,
        schedule: &CostSchedule,
    ) -> Result<Self> {
        let distance = DistanceKm::new(distance_km)?;
        let mut shipment = Self {
            id,
            category,
            distance,
            identifier: None,
            total_cost: Decimal::ZERO,
            insurance_cost: None,
        };
        shipment.recompute(schedule);
        Ok(shipment)
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// True when a numbered category still lacks a real identifier.
    pub fn needs_identifier(&self) -> bool {
        self.category.sequence_code().is_some()
            && self
                .identifier
                .as_deref()
                .is_none_or(|id| id.trim().is_empty() || id == PENDING_IDENTIFIER)
    }

    /// Validates the new distance before touching any field.
    pub fn set_distance(&mut self, distance_km: i64, schedule: &CostSchedule) -> Result<()> {
        self.distance = DistanceKm::new(distance_km)?;
        self.recompute(schedule);
        Ok(())
    }

    pub fn recompute(&mut self, schedule: &CostSchedule) {
        self.total_cost = calculate_total_cost(self, schedule);
        self.insurance_cost = match self.category {
            ShipmentCategory::Fragile => Some(schedule.insurance_cost(self.distance)),
            ShipmentCategory::Standard | ShipmentCategory::Priority => None,
        };
    }

    pub fn category(&self) -> ShipmentCategory {
        self.category
    }

    pub fn distance(&self) -> DistanceKm {
        self.distance
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn insurance_cost(&self) -> Option<Decimal> {
        self.insurance_cost
    }
}
