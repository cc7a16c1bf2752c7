//! # Inbound Ports
//!
//! API trait defining what the Interchain Security subsystem can do.

use crate::domain::{IsmResult, MessageId, ModuleType, VerificationRecord};
use async_trait::async_trait;

/// Interchain security module - inbound port.
///
/// `verify` never answers `Ok(false)`: anything short of a verified
/// message is an error, and callers must not act on the message.
#[async_trait]
pub trait InterchainSecurityModule: Send + Sync {
    /// ISM type code reported to the mailbox.
    fn module_type(&self) -> ModuleType;

    /// Decide whether `message` is authentic, releasing its value once.
    async fn verify(&self, metadata: &[u8], message: &[u8]) -> IsmResult<bool>;

    /// Direct delivery: the bridge forwards the hook's `verifyMessageId`
    /// call, carrying `value` to escrow for the recipient.
    async fn verify_message_id(&self, id: MessageId, value: u128) -> IsmResult<()>;

    /// Check the ledger for an encoded message.
    fn is_verified(&self, message: &[u8]) -> IsmResult<bool>;

    /// Ledger record for an identifier.
    fn status(&self, id: &MessageId) -> VerificationRecord;
}
