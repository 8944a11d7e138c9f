use crate::application::locks::{EntityKind, EntityLocks};
use crate::domain::grand_total::ShipmentGrandTotal;
use crate::domain::loyalty::{LoyaltyAnalysis, LoyaltyRules};
use crate::domain::ports::{AnalysisStoreBox, SequenceBox, ShipmentStoreBox};
use crate::domain::shipment::{CostSchedule, Shipment, ShipmentCategory};
use crate::domain::transaction::Transaction;
use crate::error::{Result, RuleError};
use tracing::{debug, info};

const ANALYSIS_SEQUENCE: &str = "loyalty.analysis";
const SHIPMENT_SEQUENCE: &str = "shipment";

/// The main entry point for loyalty scoring and shipment costing.
///
/// `RuleEngine` owns the storage backends and the identifier sequence. Every
/// operation that reads and rewrites a record holds that record's lock, so
/// classification always completes before scoring reads it and a distance
/// change is fully applied before anyone else recomputes the same shipment.
pub struct RuleEngine {
    analysis_store: AnalysisStoreBox,
    shipment_store: ShipmentStoreBox,
    sequence: SequenceBox,
    loyalty_rules: LoyaltyRules,
    cost_schedule: CostSchedule,
    locks: EntityLocks,
}

impl RuleEngine {
    /// Creates a new `RuleEngine` with the default rules and rates.
    ///
    /// # Arguments
    ///
    /// * `analysis_store` - The store for loyalty analyses.
    /// * `shipment_store` - The store for shipments.
    /// * `sequence` - Source of record ids and shipment identifiers.
    pub fn new(
        analysis_store: AnalysisStoreBox,
        shipment_store: ShipmentStoreBox,
        sequence: SequenceBox,
    ) -> Self {
        Self {
            analysis_store,
            shipment_store,
            sequence,
            loyalty_rules: LoyaltyRules::default(),
            cost_schedule: CostSchedule::default(),
            locks: EntityLocks::new(),
        }
    }

    /// Replaces the rules and rates after validating them.
    pub fn with_rules(
        mut self,
        loyalty_rules: LoyaltyRules,
        cost_schedule: CostSchedule,
    ) -> Result<Self> {
        loyalty_rules.validate()?;
        cost_schedule.validate()?;
        self.loyalty_rules = loyalty_rules;
        self.cost_schedule = cost_schedule;
        Ok(self)
    }

    pub fn loyalty_rules(&self) -> &LoyaltyRules {
        &self.loyalty_rules
    }

    pub fn cost_schedule(&self) -> &CostSchedule {
        &self.cost_schedule
    }

    pub async fn create_analysis(&self, name: &str) -> Result<LoyaltyAnalysis> {
        if name.trim().is_empty() {
            return Err(RuleError::InvalidAnalysis(
                "customer name is required".to_string(),
            ));
        }
        let id = self.sequence.next_value(ANALYSIS_SEQUENCE).await?;
        let analysis = LoyaltyAnalysis::new(id, name)?;
        self.analysis_store.store(analysis.clone()).await?;
        info!(analysis = id, name, "loyalty analysis created");
        Ok(analysis)
    }

    pub async fn add_transaction(&self, analysis_id: u64, tx: Transaction) -> Result<()> {
        let _guard = self.locks.acquire(EntityKind::Analysis, analysis_id).await;
        let mut analysis = self.load_analysis(analysis_id).await?;
        analysis.add_transaction(tx);
        self.analysis_store.store(analysis).await
    }

    /// Marks a transaction failed by hand; classification will never undo it.
    pub async fn mark_transaction_failed(&self, analysis_id: u64, index: usize) -> Result<()> {
        let _guard = self.locks.acquire(EntityKind::Analysis, analysis_id).await;
        let mut analysis = self.load_analysis(analysis_id).await?;
        analysis.mark_failed(index)?;
        self.analysis_store.store(analysis).await
    }

    /// Classifies then scores the analysis and persists the result.
    pub async fn run_loyalty(&self, analysis_id: u64) -> Result<LoyaltyAnalysis> {
        let _guard = self.locks.acquire(EntityKind::Analysis, analysis_id).await;
        let mut analysis = self.load_analysis(analysis_id).await?;

        let score = analysis.run(&self.loyalty_rules);
        info!(
            analysis = analysis_id,
            total_points = score.total_points,
            tier = score.max_discount.code(),
            high_value = score.high_value_count,
            failed = analysis.failed_count(),
            "loyalty scored"
        );

        self.analysis_store.store(analysis.clone()).await?;
        Ok(analysis)
    }

    pub async fn analysis(&self, analysis_id: u64) -> Result<LoyaltyAnalysis> {
        self.load_analysis(analysis_id).await
    }

    pub async fn analyses(&self) -> Result<Vec<LoyaltyAnalysis>> {
        self.analysis_store.get_all().await
    }

    /// Deletes the analysis and every transaction it owns.
    pub async fn delete_analysis(&self, analysis_id: u64) -> Result<bool> {
        let deleted = {
            let _guard = self.locks.acquire(EntityKind::Analysis, analysis_id).await;
            self.analysis_store.delete(analysis_id).await?
        };
        debug!(analysis = analysis_id, deleted, "loyalty analysis deleted");
        Ok(deleted)
    }

    /// Validates, numbers and stores a new shipment.
    ///
    /// A fragile or priority shipment without an identifier (or with the `New`
    /// placeholder) gets the next one from its category sequence. Nothing is
    /// stored when validation fails.
    pub async fn create_shipment(
        &self,
        category: ShipmentCategory,
        distance_km: i64,
        identifier: Option<String>,
    ) -> Result<Shipment> {
        let mut shipment = Shipment::new(0, category, distance_km, &self.cost_schedule)?;
        shipment.identifier = identifier;

        shipment.id = self.sequence.next_value(SHIPMENT_SEQUENCE).await?;
        if shipment.needs_identifier()
            && let Some(code) = category.sequence_code()
        {
            let n = self.sequence.next_value(code).await?;
            shipment.identifier = category.format_identifier(n);
        }

        self.shipment_store.store(shipment.clone()).await?;
        info!(
            shipment = shipment.id,
            %category,
            identifier = shipment.identifier.as_deref().unwrap_or(""),
            total_cost = %shipment.total_cost(),
            "shipment created"
        );
        Ok(shipment)
    }

    /// Changes the distance and recomputes every cost derived from it.
    pub async fn update_distance(&self, shipment_id: u64, distance_km: i64) -> Result<Shipment> {
        let _guard = self.locks.acquire(EntityKind::Shipment, shipment_id).await;
        let mut shipment = self.load_shipment(shipment_id).await?;

        shipment.set_distance(distance_km, &self.cost_schedule)?;
        self.shipment_store.store(shipment.clone()).await?;
        debug!(
            shipment = shipment_id,
            distance_km,
            total_cost = %shipment.total_cost(),
            "shipment distance updated"
        );
        Ok(shipment)
    }

    pub async fn shipment(&self, shipment_id: u64) -> Result<Shipment> {
        self.load_shipment(shipment_id).await
    }

    pub async fn shipments(&self) -> Result<Vec<Shipment>> {
        self.shipment_store.get_all().await
    }

    /// Builds the grand total from the shipments as they are stored right now.
    pub async fn grand_total(
        &self,
        fragile_id: Option<u64>,
        priority_id: Option<u64>,
    ) -> Result<ShipmentGrandTotal> {
        let fragile = match fragile_id {
            Some(id) => Some(self.load_shipment(id).await?),
            None => None,
        };
        let priority = match priority_id {
            Some(id) => Some(self.load_shipment(id).await?),
            None => None,
        };
        ShipmentGrandTotal::new(fragile, priority)
    }

    async fn load_analysis(&self, analysis_id: u64) -> Result<LoyaltyAnalysis> {
        self.analysis_store
            .get(analysis_id)
            .await?
            .ok_or(RuleError::AnalysisNotFound(analysis_id))
    }

    async fn load_shipment(&self, shipment_id: u64) -> Result<Shipment> {
        self.shipment_store
            .get(shipment_id)
            .await?
            .ok_or(RuleError::ShipmentNotFound(shipment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grand_total::grand_total;
    use crate::domain::loyalty::DiscountTier;
    use crate::domain::shipment::calculate_total_cost;
    use crate::domain::transaction::TransactionStatus;
    use crate::infrastructure::in_memory::{
        InMemoryAnalysisStore, InMemorySequence, InMemoryShipmentStore,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn engine() -> RuleEngine {
        RuleEngine::new(
            Box::new(InMemoryAnalysisStore::new()),
            Box::new(InMemoryShipmentStore::new()),
            Box::new(InMemorySequence::new()),
        )
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_run_loyalty_persists_scores() {
        let engine = engine();
        let analysis = engine.create_analysis("Budi").await.unwrap();

        for day in [1, 2, 3, 4] {
            engine
                .add_transaction(analysis.id, Transaction::new(date(day), dec!(600000)))
                .await
                .unwrap();
        }
        engine
            .add_transaction(analysis.id, Transaction::new(date(7), dec!(0)))
            .await
            .unwrap();

        let scored = engine.run_loyalty(analysis.id).await.unwrap();
        assert_eq!(scored.total_points, 20);
        assert_eq!(scored.max_discount, DiscountTier::Premium);
        assert_eq!(scored.high_value_count, 4);
        assert_eq!(scored.failed_count(), 1);

        let stored = engine.analysis(analysis.id).await.unwrap();
        assert_eq!(stored, scored);
    }

    #[tokio::test]
    async fn test_manual_failure_survives_run() {
        let engine = engine();
        let analysis = engine.create_analysis("Sari").await.unwrap();
        engine
            .add_transaction(analysis.id, Transaction::new(date(6), dec!(900000)))
            .await
            .unwrap();
        engine.mark_transaction_failed(analysis.id, 0).await.unwrap();

        let scored = engine.run_loyalty(analysis.id).await.unwrap();
        assert_eq!(scored.transactions[0].status, TransactionStatus::Failed);
        assert_eq!(scored.total_points, 0);
        assert_eq!(scored.high_value_count, 0);
    }

    #[tokio::test]
    async fn test_delete_analysis() {
        let engine = engine();
        let analysis = engine.create_analysis("Budi").await.unwrap();
        assert!(engine.delete_analysis(analysis.id).await.unwrap());
        assert!(matches!(
            engine.run_loyalty(analysis.id).await,
            Err(RuleError::AnalysisNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.create_analysis(" ").await,
            Err(RuleError::InvalidAnalysis(_))
        ));
        assert!(engine.analyses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_shipment_assigns_identifiers() {
        let engine = engine();
        let fragile = engine
            .create_shipment(ShipmentCategory::Fragile, 10, None)
            .await
            .unwrap();
        let fragile2 = engine
            .create_shipment(ShipmentCategory::Fragile, 10, Some("New".to_string()))
            .await
            .unwrap();
        let priority = engine
            .create_shipment(ShipmentCategory::Priority, 10, Some("PRI-MANUAL".to_string()))
            .await
            .unwrap();
        let standard = engine
            .create_shipment(ShipmentCategory::Standard, 10, None)
            .await
            .unwrap();

        assert_eq!(fragile.identifier.as_deref(), Some("FRG/00001"));
        assert_eq!(fragile2.identifier.as_deref(), Some("FRG/00002"));
        assert_eq!(priority.identifier.as_deref(), Some("PRI-MANUAL"));
        assert_eq!(standard.identifier, None);
        assert_eq!(engine.shipments().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_shipment_is_not_stored() {
        let engine = engine();
        let result = engine
            .create_shipment(ShipmentCategory::Priority, -1, None)
            .await;
        assert!(matches!(result, Err(RuleError::InvalidShipment(_))));
        assert!(engine.shipments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_distance_update_refreshes_grand_total() {
        let engine = engine();
        let fragile = engine
            .create_shipment(ShipmentCategory::Fragile, 10, None)
            .await
            .unwrap();
        let priority = engine
            .create_shipment(ShipmentCategory::Priority, 10, None)
            .await
            .unwrap();

        let before = engine
            .grand_total(Some(fragile.id), Some(priority.id))
            .await
            .unwrap();
        assert_eq!(before.grand_total, dec!(197000));

        let updated = engine.update_distance(fragile.id, 20).await.unwrap();
        assert_eq!(updated.total_cost(), dec!(132000));
        assert_eq!(updated.insurance_cost(), Some(dec!(12000)));

        let after = engine
            .grand_total(Some(fragile.id), Some(priority.id))
            .await
            .unwrap();
        assert_eq!(after.fragile_total, dec!(132000));
        assert_eq!(after.grand_total, dec!(252000));
    }

    #[tokio::test]
    async fn test_rejected_distance_update_keeps_record() {
        let engine = engine();
        let shipment = engine
            .create_shipment(ShipmentCategory::Standard, 10, None)
            .await
            .unwrap();
        assert!(engine.update_distance(shipment.id, -3).await.is_err());
        assert_eq!(engine.shipment(shipment.id).await.unwrap(), shipment);
    }

    #[tokio::test]
    async fn test_grand_total_without_shipments() {
        let engine = engine();
        let totals = engine.grand_total(None, None).await.unwrap();
        assert_eq!(totals.grand_total, Decimal::ZERO);
        assert!(matches!(
            engine.grand_total(Some(42), None).await,
            Err(RuleError::ShipmentNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_custom_schedule_applies() {
        let schedule = CostSchedule {
            per_km_rate: dec!(1000),
            ..CostSchedule::default()
        };
        let engine = engine()
            .with_rules(LoyaltyRules::default(), schedule)
            .unwrap();
        let shipment = engine
            .create_shipment(ShipmentCategory::Standard, 10, None)
            .await
            .unwrap();
        assert_eq!(shipment.total_cost(), dec!(30000));
    }

    #[tokio::test]
    async fn test_configured_handling_fee_is_consistent_everywhere() {
        let schedule = CostSchedule {
            handling_fee: dec!(30000),
            ..CostSchedule::default()
        };
        let engine = engine()
            .with_rules(LoyaltyRules::default(), schedule)
            .unwrap();
        let fragile = engine
            .create_shipment(ShipmentCategory::Fragile, 10, None)
            .await
            .unwrap();

        assert_eq!(fragile.total_cost(), dec!(88000));
        assert_eq!(
            calculate_total_cost(&fragile, engine.cost_schedule()),
            fragile.total_cost()
        );

        let totals = engine.grand_total(Some(fragile.id), None).await.unwrap();
        assert_eq!(totals.grand_total, dec!(88000));
        assert_eq!(grand_total(&totals), dec!(88000));
    }

    #[tokio::test]
    async fn test_concurrent_runs_on_same_analysis() {
        let engine = Arc::new(engine());
        let analysis = engine.create_analysis("Budi").await.unwrap();
        for day in 1..=20 {
            engine
                .add_transaction(analysis.id, Transaction::new(date(day), dec!(600000)))
                .await
                .unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                let id = analysis.id;
                tokio::spawn(async move { engine.run_loyalty(id).await.unwrap() })
            })
            .collect();

        for handle in handles {
            let scored = handle.await.unwrap();
            assert_eq!(scored.total_points, 100);
            assert_eq!(scored.max_discount, DiscountTier::SuperVip);
        }
    }
}
