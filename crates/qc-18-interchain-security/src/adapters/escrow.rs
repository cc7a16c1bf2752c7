//! Escrow Releaser Adapter
//!
//! Implements `ValueReleaser` over an in-memory balance sheet. Balances are
//! read through `get_balance`, the only surface the token layer exposes.

use crate::domain::{CanonicalAddress, IsmError, IsmResult, MessageId};
use crate::ports::outbound::ValueReleaser;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// One fired release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Release {
    /// Message the release belongs to.
    pub id: MessageId,
    /// Who received the value.
    pub recipient: CanonicalAddress,
    /// Amount transferred.
    pub amount: u128,
}

/// In-memory escrow.
#[derive(Default)]
pub struct EscrowReleaser {
    balances: RwLock<HashMap<CanonicalAddress, u128>>,
    releases: RwLock<Vec<Release>>,
    failing: AtomicBool,
}

impl EscrowReleaser {
    /// Create an empty escrow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an address.
    pub fn get_balance(&self, address: &CanonicalAddress) -> u128 {
        self.balances.read().get(address).copied().unwrap_or(0)
    }

    /// Every release fired so far, in order.
    pub fn releases(&self) -> Vec<Release> {
        self.releases.read().clone()
    }

    /// Releases fired for one message.
    pub fn release_count(&self, id: &MessageId) -> usize {
        self.releases.read().iter().filter(|r| r.id == *id).count()
    }

    /// Make subsequent releases fail (simulates a reverting recipient).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ValueReleaser for EscrowReleaser {
    async fn release(
        &self,
        id: MessageId,
        recipient: CanonicalAddress,
        amount: u128,
    ) -> IsmResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IsmError::ReleaseFailed {
                id,
                reason: "recipient rejected transfer".to_string(),
            });
        }

        if amount > 0 {
            let mut balances = self.balances.write();
            let balance = balances.entry(recipient).or_insert(0);
            let Some(credited) = balance.checked_add(amount) else {
                return Err(IsmError::ReleaseFailed {
                    id,
                    reason: format!("balance of {} would overflow", recipient),
                });
            };
            *balance = credited;
        }
        self.releases.write().push(Release {
            id,
            recipient,
            amount,
        });

        info!(
            "[qc-18] Released {} to {} for message {}",
            amount,
            recipient,
            id.short()
        );
        Ok(())
    }
}
