//! # Domain Value Objects
//!
//! Immutable value types for Interchain Security.

use super::errors::{Address, Hash};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Domain identifier (chain id as seen by the messaging protocol).
pub type Domain = u32;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// 32-byte canonical address.
///
/// Every address the module compares is held in this form, so an address
/// read from the execution context and one decoded from proof metadata are
/// equal exactly when they denote the same principal. EVM addresses are
/// left-padded with 12 zero bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalAddress(pub Hash);

impl CanonicalAddress {
    /// Zero address.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Left-pad a 20-byte EVM address.
    pub fn from_evm(address: Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(&address);
        Self(bytes)
    }

    /// Build from a 20- or 32-byte slice.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        match slice.len() {
            20 => {
                let mut address = [0u8; 20];
                address.copy_from_slice(slice);
                Some(Self::from_evm(address))
            }
            32 => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(slice);
                Some(Self(bytes))
            }
            _ => None,
        }
    }

    /// Parse a hex string (optional `0x` prefix) of 20 or 32 bytes.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).ok()?;
        Self::from_slice(&bytes)
    }

    /// The 20-byte EVM form, if the high 12 bytes are zero.
    pub fn to_evm(&self) -> Option<Address> {
        if self.0[..12].iter().any(|b| *b != 0) {
            return None;
        }
        let mut address = [0u8; 20];
        address.copy_from_slice(&self.0[12..]);
        Some(address)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Check for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalAddress({})", self)
    }
}

/// Content-derived message identifier (Keccak-256 of the encoded message).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub Hash);

impl MessageId {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Short form for log lines.
    pub fn short(&self) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}..", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self)
    }
}

impl From<Hash> for MessageId {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}

/// ISM type codes reported to the destination mailbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModuleType {
    /// Unused.
    Unused = 0,
    /// Routing ISM.
    Routing = 1,
    /// Aggregation ISM.
    Aggregation = 2,
    /// Legacy multisig.
    LegacyMultisig = 3,
    /// Merkle-root multisig.
    MerkleRootMultisig = 4,
    /// Message-id multisig.
    MessageIdMultisig = 5,
    /// No relayer-supplied metadata needed beyond the bridge proof.
    Null = 6,
    /// CCIP-read.
    CcipRead = 7,
}

/// Verification state machine: `Unverified -> Verified`, one way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// No successful verification recorded.
    #[default]
    Unverified,
    /// Terminal.
    Verified,
}

impl VerificationStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: VerificationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Unverified, Self::Verified) | (Self::Verified, Self::Verified)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// How a `verify` call was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationPath {
    /// Ledger already held `Verified`.
    Cached,
    /// Call arrived through the bridge from the authorized hook.
    Direct,
    /// Proof replayed through the bridge outbox.
    Proof,
}

impl VerificationPath {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Direct => "direct",
            Self::Proof => "proof",
        }
    }
}
