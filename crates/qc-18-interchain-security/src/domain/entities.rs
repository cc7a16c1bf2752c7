//! # Domain Entities
//!
//! Core entities for Interchain Security.

use super::errors::Hash;
use super::value_objects::{CanonicalAddress, Domain, VerificationPath, VerificationStatus};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Current message format version.
pub const MESSAGE_VERSION: u8 = 3;

/// Cross-domain message.
///
/// Immutable once constructed; its identifier is derived from every field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Format version.
    pub version: u8,
    /// Per-origin nonce.
    pub nonce: u32,
    /// Origin domain.
    pub origin: Domain,
    /// Sender on the origin domain.
    pub sender: CanonicalAddress,
    /// Destination domain.
    pub destination: Domain,
    /// Recipient on the destination domain.
    pub recipient: CanonicalAddress,
    /// Opaque body.
    pub body: Vec<u8>,
}

impl Message {
    /// Create a message with the current version.
    pub fn new(
        nonce: u32,
        origin: Domain,
        sender: CanonicalAddress,
        destination: Domain,
        recipient: CanonicalAddress,
        body: Vec<u8>,
    ) -> Self {
        Self {
            version: MESSAGE_VERSION,
            nonce,
            origin,
            sender,
            destination,
            recipient,
            body,
        }
    }
}

/// Proof that the authorized hook emitted a `verifyMessageId` call on the
/// origin rollup, replayable against the native bridge outbox.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMetadata {
    /// Merkle branch, leaf to root.
    pub merkle_proof: Vec<Hash>,
    /// Leaf position in the outbox tree.
    pub leaf_index: U256,
    /// Origin-domain account that sent the call.
    pub claimed_sender: CanonicalAddress,
    /// Destination-domain account the call targets.
    pub claimed_target: CanonicalAddress,
    /// Origin rollup block number.
    pub origin_block: U256,
    /// Destination block number at which the call was posted.
    pub destination_block: U256,
    /// Origin rollup timestamp.
    pub origin_timestamp: U256,
    /// Selector (4 bytes) followed by the claimed message id (32 bytes).
    pub payload: Vec<u8>,
}

/// Per-identifier ledger entry.
///
/// `status` and `released` only ever move forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Verification state.
    pub status: VerificationStatus,
    /// Release side effect has fired.
    pub released: bool,
    /// Native value delivered with direct calls, held until release.
    pub escrowed: u128,
}

impl VerificationRecord {
    /// Check if verified.
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

/// Evidence that a message is authentic, resolved once per call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationEvidence {
    /// The call itself was forwarded by the bridge from the authorized hook.
    DirectContext,
    /// A proof to be replayed through the bridge outbox.
    ProofReplay(ProofMetadata),
}

impl AuthorizationEvidence {
    /// The verification path this evidence leads to.
    pub fn path(&self) -> VerificationPath {
        match self {
            Self::DirectContext => VerificationPath::Direct,
            Self::ProofReplay(_) => VerificationPath::Proof,
        }
    }
}
