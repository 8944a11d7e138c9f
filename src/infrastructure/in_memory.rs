use crate::domain::loyalty::LoyaltyAnalysis;
use crate::domain::ports::{AnalysisStore, Sequence, ShipmentStore};
use crate::domain::shipment::Shipment;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A thread-safe in-memory store for loyalty analyses.
///
/// Uses `Arc<RwLock<HashMap<u64, LoyaltyAnalysis>>>` to allow shared concurrent access.
/// Transactions live inside their analysis, so deleting one drops the other.
#[derive(Default, Clone)]
pub struct InMemoryAnalysisStore {
    analyses: Arc<RwLock<HashMap<u64, LoyaltyAnalysis>>>,
}

impl InMemoryAnalysisStore {
    /// Creates a new, empty in-memory analysis store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn store(&self, analysis: LoyaltyAnalysis) -> Result<()> {
        let mut analyses = self.analyses.write().await;
        analyses.insert(analysis.id, analysis);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<LoyaltyAnalysis>> {
        let analyses = self.analyses.read().await;
        Ok(analyses.get(&id).cloned())
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut analyses = self.analyses.write().await;
        Ok(analyses.remove(&id).is_some())
    }

    async fn get_all(&self) -> Result<Vec<LoyaltyAnalysis>> {
        let analyses = self.analyses.read().await;
        let mut all: Vec<_> = analyses.values().cloned().collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }
}

/// A thread-safe in-memory store for shipments.
#[derive(Default, Clone)]
pub struct InMemoryShipmentStore {
    shipments: Arc<RwLock<HashMap<u64, Shipment>>>,
}

impl InMemoryShipmentStore {
    /// Creates a new, empty in-memory shipment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn store(&self, shipment: Shipment) -> Result<()> {
        let mut shipments = self.shipments.write().await;
        shipments.insert(shipment.id, shipment);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Shipment>> {
        let shipments = self.shipments.read().await;
        Ok(shipments.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Shipment>> {
        let shipments = self.shipments.read().await;
        let mut all: Vec<_> = shipments.values().cloned().collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }
}

/// Per-code counters held in memory; values restart at 1 for every new instance.
#[derive(Default, Clone)]
pub struct InMemorySequence {
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl InMemorySequence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Sequence for InMemorySequence {
    async fn next_value(&self, code: &str) -> Result<u64> {
        let mut counters = self.counters.lock().await;
        let counter = counters.entry(code.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
