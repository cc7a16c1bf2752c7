//! Per-identifier critical sections.
//!
//! Calls on the same message identifier run one at a time, across the
//! bridge `.await`; calls on different identifiers do not contend.

use crate::domain::MessageId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed async locks.
#[derive(Default)]
pub struct IdentifierLocks {
    slots: Mutex<HashMap<MessageId, Arc<AsyncMutex<()>>>>,
}

impl IdentifierLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the critical section for `id`.
    pub async fn lock(&self, id: MessageId) -> IdentifierGuard<'_> {
        let slot = self.slots.lock().entry(id).or_default().clone();
        let guard = slot.clone().lock_owned().await;
        IdentifierGuard {
            locks: self,
            id,
            slot,
            guard: Some(guard),
        }
    }

    /// Identifiers with a live slot.
    pub fn active(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Held for the duration of one call on one identifier.
pub struct IdentifierGuard<'a> {
    locks: &'a IdentifierLocks,
    id: MessageId,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdentifierGuard<'_> {
    fn drop(&mut self) {
        // Release the async lock before inspecting the slot's holders.
        self.guard.take();
        let mut slots = self.locks.slots.lock();
        // Only the table and this guard hold the slot: nobody is waiting.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_slot_removed_after_release() {
        let locks = IdentifierLocks::new();
        {
            let _g = locks.lock(MessageId([1u8; 32])).await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_same_identifier_is_serialized() {
        let locks = Arc::new(IdentifierLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _g = locks.lock(MessageId([1u8; 32])).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_different_identifiers_do_not_block() {
        let locks = IdentifierLocks::new();
        let _a = locks.lock(MessageId([1u8; 32])).await;
        let _b = tokio::time::timeout(Duration::from_millis(50), locks.lock(MessageId([2u8; 32])))
            .await
            .expect("second identifier should not wait");
        assert_eq!(locks.active(), 2);
    }
}
