use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Which kind of record a lock protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Analysis,
    Shipment,
}

type LockMap = HashMap<(EntityKind, u64), Arc<AsyncMutex<()>>>;

/// One critical section per record.
///
/// Recomputations of the same analysis or shipment are serialized; different
/// records never wait on each other. An entry lives only while some task holds
/// or waits for it, so the map stays as small as the current contention.
#[derive(Default)]
pub struct EntityLocks {
    locks: Mutex<LockMap>,
}

/// Holds a record's lock; releasing it also drops the map entry when no other
/// task is waiting.
pub struct EntityGuard<'a> {
    locks: &'a EntityLocks,
    key: (EntityKind, u64),
    guard: Option<OwnedMutexGuard<()>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, kind: EntityKind, id: u64) -> EntityGuard<'_> {
        let key = (kind, id);
        let lock = {
            let mut locks = self.map();
            locks
                .entry(key)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        EntityGuard {
            locks: self,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn map(&self) -> std::sync::MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.map().len()
    }
}

impl Drop for EntityGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.map();
        // Clones are only taken under the map lock, so a count of one means
        // nobody holds or awaits this entry.
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}
