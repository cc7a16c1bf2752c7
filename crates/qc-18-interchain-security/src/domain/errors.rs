//! # Domain Errors
//!
//! Error types for Interchain Security.
//!
//! Every variant is fatal to the call that produced it. Verification
//! failures leave no ledger state behind; a `ReleaseFailed` after a
//! successful verification leaves the message verified and unreleased.

use super::value_objects::{CanonicalAddress, MessageId};
use thiserror::Error;

/// Hash type (32-byte Keccak-256).
pub type Hash = [u8; 32];

/// EVM address type (20-byte).
pub type Address = [u8; 20];

/// Interchain security error types.
#[derive(Debug, Error)]
pub enum IsmError {
    /// Configuration rejected at construction.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Validation failure detail
        reason: String,
    },

    /// Bridge gateway does not resolve to a live endpoint.
    #[error("Invalid gateway: {reason}")]
    InvalidGateway {
        /// Why the gateway was refused
        reason: String,
    },

    /// Message bytes do not decode.
    #[error("Malformed message: {reason}")]
    MalformedMessage {
        /// Decode failure detail
        reason: String,
    },

    /// Proof metadata bytes do not match the fixed schema.
    #[error("Malformed metadata: {reason}")]
    MalformedMetadata {
        /// Decode failure detail
        reason: String,
    },

    /// Proof was emitted by someone other than the authorized hook.
    #[error("Sender mismatch: expected {expected}, got {actual}")]
    SenderMismatch {
        /// Authorized hook
        expected: CanonicalAddress,
        /// Sender claimed by the proof
        actual: CanonicalAddress,
    },

    /// Proof payload commits to a different message.
    #[error("Message id mismatch: expected {expected}, got {actual}")]
    MessageIdMismatch {
        /// Identifier of the message being verified
        expected: MessageId,
        /// Identifier embedded in the proof payload
        actual: MessageId,
    },

    /// The bridge refused the proof (bad inclusion, unknown root, spent).
    #[error("Bridge rejected proof: {reason}")]
    BridgeRejected {
        /// Revert reason reported by the bridge
        reason: String,
    },

    /// The bridge did not answer in time.
    #[error("Bridge unavailable: {reason}")]
    BridgeUnavailable {
        /// Transport failure detail
        reason: String,
    },

    /// Direct entry point invoked outside an authorized bridge call.
    #[error("Unauthorized caller: call did not originate from the authorized hook")]
    Unauthorized,

    /// Escrowed value for a message would exceed `u128::MAX`.
    #[error("Escrow overflow for {id}: {escrowed} + {amount}")]
    EscrowOverflow {
        /// Message the value was sent for
        id: MessageId,
        /// Already escrowed
        escrowed: u128,
        /// Value that did not fit
        amount: u128,
    },

    /// The release side effect failed.
    #[error("Release failed for {id}: {reason}")]
    ReleaseFailed {
        /// Message whose value could not be released
        id: MessageId,
        /// Failure detail
        reason: String,
    },
}

impl IsmError {
    /// Short, stable label used for metrics and logs.
    pub fn reason_label(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "invalid_config",
            Self::InvalidGateway { .. } => "invalid_gateway",
            Self::MalformedMessage { .. } => "malformed_message",
            Self::MalformedMetadata { .. } => "malformed_metadata",
            Self::SenderMismatch { .. } => "sender_mismatch",
            Self::MessageIdMismatch { .. } => "message_id_mismatch",
            Self::BridgeRejected { .. } => "bridge_rejected",
            Self::BridgeUnavailable { .. } => "bridge_unavailable",
            Self::Unauthorized => "unauthorized",
            Self::EscrowOverflow { .. } => "escrow_overflow",
            Self::ReleaseFailed { .. } => "release_failed",
        }
    }

    pub(crate) fn malformed_metadata(reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_message(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }
}

/// Result type for interchain security operations.
pub type IsmResult<T> = Result<T, IsmError>;
