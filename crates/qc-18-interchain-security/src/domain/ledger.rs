//! # Verification Ledger
//!
//! Per-identifier verification and release state. The only mutable state
//! of a module instance; every transition is monotonic.

use super::entities::VerificationRecord;
use super::errors::{IsmError, IsmResult};
use super::value_objects::{MessageId, VerificationStatus};
use std::collections::HashMap;

/// Message identifier -> record. Absent means unverified, unreleased.
#[derive(Debug, Default)]
pub struct VerificationLedger {
    records: HashMap<MessageId, VerificationRecord>,
}

impl VerificationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an identifier is verified.
    pub fn is_verified(&self, id: &MessageId) -> bool {
        self.records
            .get(id)
            .map(VerificationRecord::is_verified)
            .unwrap_or(false)
    }

    /// Check if the release side effect has fired for an identifier.
    pub fn is_released(&self, id: &MessageId) -> bool {
        self.records.get(id).map(|r| r.released).unwrap_or(false)
    }

    /// Set `Verified`. Idempotent; there is no way back.
    pub fn mark_verified(&mut self, id: MessageId) {
        let record = self.records.entry(id).or_default();
        debug_assert!(record.status.can_transition_to(VerificationStatus::Verified));
        record.status = VerificationStatus::Verified;
    }

    /// Add native value delivered with a direct call.
    ///
    /// Value arriving after the release stays escrowed; release never fires twice.
    /// Fails with `EscrowOverflow`, leaving the record untouched, if the total
    /// would not fit.
    pub fn add_escrow(&mut self, id: MessageId, amount: u128) -> IsmResult<()> {
        let escrowed = self.record(&id).escrowed;
        let Some(total) = escrowed.checked_add(amount) else {
            return Err(IsmError::EscrowOverflow {
                id,
                escrowed,
                amount,
            });
        };
        self.records.entry(id).or_default().escrowed = total;
        Ok(())
    }

    /// Amount owed to the recipient, or `None` if already released.
    pub fn pending_release(&self, id: &MessageId) -> Option<u128> {
        match self.records.get(id) {
            Some(record) if record.released => None,
            Some(record) => Some(record.escrowed),
            None => Some(0),
        }
    }

    /// Record that the release fired; drains the escrow.
    pub fn mark_released(&mut self, id: MessageId) {
        let record = self.records.entry(id).or_default();
        record.released = true;
        record.escrowed = 0;
    }

    /// Snapshot of the record for an identifier.
    pub fn record(&self, id: &MessageId) -> VerificationRecord {
        self.records.get(id).copied().unwrap_or_default()
    }

    /// Number of verified identifiers.
    pub fn verified_count(&self) -> usize {
        self.records.values().filter(|r| r.is_verified()).count()
    }
}
