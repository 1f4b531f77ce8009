//! Per-entity async locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::EntityId;

/// One async mutex per entity ID, created on demand and dropped again once
/// nobody holds or waits for it.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Mutex<HashMap<EntityId, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    /// Waits until no other operation holds `id`.
    pub(crate) async fn acquire(&self, id: EntityId) -> KeyGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(id).or_default().clone()
        };
        let guard = slot.clone().lock_owned().await;

        KeyGuard {
            locks: self,
            id,
            slot,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    id: EntityId,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut slots = self.locks.slots.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and this guard still reference the slot: no waiters.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::default());
        let first = locks.acquire(1).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::default();
        let _a = locks.acquire(1).await;
        let _b = locks.acquire(2).await;
        assert_eq!(locks.len(), 2);
    }
}
