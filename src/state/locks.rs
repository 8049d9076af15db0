//! Per-key async locks for serializing read-modify-write on one partition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

const INITIAL_PRUNE_AT: usize = 64;

struct Registry {
    locks: HashMap<String, Weak<AsyncMutex<()>>>,
    prune_at: usize,
}

/// Registry of one lock per partition key.
///
/// A lock lives as long as someone holds or waits on it; idle entries are
/// pruned as the registry grows. Distinct keys never contend.
pub struct PartitionLocks {
    registry: Mutex<Registry>,
}

impl Default for PartitionLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionLocks {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                locks: HashMap::new(),
                prune_at: INITIAL_PRUNE_AT,
            }),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);

            if registry.locks.len() >= registry.prune_at {
                registry.locks.retain(|_, lock| lock.strong_count() > 0);
                registry.prune_at = (registry.locks.len() * 2).max(INITIAL_PRUNE_AT);
            }

            match registry.locks.get(key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    registry.locks.insert(key.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// Number of keys currently tracked, including idle ones not yet pruned.
    pub fn tracked(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .locks
            .len()
    }
}
