use super::loyalty::LoyaltyAnalysis;
use super::shipment::Shipment;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn store(&self, analysis: LoyaltyAnalysis) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<LoyaltyAnalysis>>;
    /// Removes the analysis together with the transactions it owns.
    async fn delete(&self, id: u64) -> Result<bool>;
    async fn get_all(&self) -> Result<Vec<LoyaltyAnalysis>>;
}

#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn store(&self, shipment: Shipment) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<Shipment>>;
    async fn get_all(&self) -> Result<Vec<Shipment>>;
}

/// Monotonic counters keyed by a sequence code, starting at 1.
#[async_trait]
pub trait Sequence: Send + Sync {
    async fn next_value(&self, code: &str) -> Result<u64>;
}

pub type AnalysisStoreBox = Box<dyn AnalysisStore>;
pub type ShipmentStoreBox = Box<dyn ShipmentStore>;
pub type SequenceBox = Box<dyn Sequence>;
