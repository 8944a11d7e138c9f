use crate::domain::loyalty::LoyaltyAnalysis;
use crate::domain::ports::{AnalysisStore, Sequence, ShipmentStore};
use crate::domain::shipment::Shipment;
use crate::error::{Result, RuleError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing loyalty analyses and their transactions.
pub const CF_ANALYSES: &str = "analyses";
/// Column Family for storing shipments.
pub const CF_SHIPMENTS: &str = "shipments";
/// Column Family for storing sequence counters.
pub const CF_SEQUENCES: &str = "sequences";

/// A persistent store implementation using RocksDB.
///
/// Handles analyses, shipments and sequence counters using separate Column
/// Families. Values are JSON; record keys are big-endian ids so iteration
/// follows creation order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    sequence_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_ANALYSES, CF_SHIPMENTS, CF_SEQUENCES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            sequence_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            RuleError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, id: u64, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, id: u64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn fetch_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl AnalysisStore for RocksDBStore {
    async fn store(&self, analysis: LoyaltyAnalysis) -> Result<()> {
        self.put(CF_ANALYSES, analysis.id, &analysis)
    }

    async fn get(&self, id: u64) -> Result<Option<LoyaltyAnalysis>> {
        self.fetch(CF_ANALYSES, id)
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let cf = self.cf(CF_ANALYSES)?;
        let key = id.to_be_bytes();
        let existed = self.db.get_pinned_cf(cf, key)?.is_some();
        if existed {
            self.db.delete_cf(cf, key)?;
        }
        Ok(existed)
    }

    async fn get_all(&self) -> Result<Vec<LoyaltyAnalysis>> {
        self.fetch_all(CF_ANALYSES)
    }
}

#[async_trait]
impl ShipmentStore for RocksDBStore {
    async fn store(&self, shipment: Shipment) -> Result<()> {
        self.put(CF_SHIPMENTS, shipment.id, &shipment)
    }

    async fn get(&self, id: u64) -> Result<Option<Shipment>> {
        self.fetch(CF_SHIPMENTS, id)
    }

    async fn get_all(&self) -> Result<Vec<Shipment>> {
        self.fetch_all(CF_SHIPMENTS)
    }
}

#[async_trait]
impl Sequence for RocksDBStore {
    async fn next_value(&self, code: &str) -> Result<u64> {
        let _guard = self.sequence_lock.lock().map_err(|_| {
            RuleError::InternalError(Box::new(std::io::Error::other(
                "sequence lock poisoned",
            )))
        })?;

        let cf = self.cf(CF_SEQUENCES)?;
        let current = match self.db.get_cf(cf, code.as_bytes())? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    RuleError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("corrupt counter for sequence {code}"),
                    )))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };

        let next = current + 1;
        self.db.put_cf(cf, code.as_bytes(), next.to_be_bytes())?;
        Ok(next)
    }
}
