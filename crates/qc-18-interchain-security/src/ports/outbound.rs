//! # Outbound Ports
//!
//! Traits for external dependencies (bridge outbox, call context, value
//! release).

use crate::domain::{CanonicalAddress, Hash, IsmError, IsmResult, MessageId, ProofMetadata};
use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::U256;

/// Arguments of the outbox `executeTransaction` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboxExecution {
    /// Merkle branch.
    pub proof: Vec<Hash>,
    /// Leaf index.
    pub index: U256,
    /// Origin-rollup sender.
    pub sender: CanonicalAddress,
    /// Destination target.
    pub target: CanonicalAddress,
    /// Origin block number.
    pub origin_block: U256,
    /// Destination block number.
    pub destination_block: U256,
    /// Origin timestamp.
    pub origin_timestamp: U256,
    /// Native value; always zero from this module.
    pub value: U256,
    /// Calldata forwarded to `target`.
    pub payload: Vec<u8>,
}

impl OutboxExecution {
    /// Build a zero-value execution from decoded metadata.
    pub fn from_metadata(metadata: &ProofMetadata) -> Self {
        Self {
            proof: metadata.merkle_proof.clone(),
            index: metadata.leaf_index,
            sender: metadata.claimed_sender,
            target: metadata.claimed_target,
            origin_block: metadata.origin_block,
            destination_block: metadata.destination_block,
            origin_timestamp: metadata.origin_timestamp,
            value: U256::zero(),
            payload: metadata.payload.clone(),
        }
    }
}

/// Native bridge gateway - outbound port.
///
/// The gateway is the authority on proof validity: inclusion, root
/// validity and replay are all its checks. Callers await
/// `execute_transaction` to completion; a gateway with a transport
/// deadline of its own returns `BridgeUnavailable` only when it knows the
/// transaction did not commit.
#[async_trait]
pub trait BridgeGateway: Send + Sync {
    /// Whether the gateway resolves to a live endpoint.
    async fn is_live(&self) -> bool;

    /// Submit a proof; any refusal is `BridgeRejected`.
    async fn execute_transaction(&self, execution: OutboxExecution) -> IsmResult<()>;
}

/// Cross-domain call context - outbound port.
///
/// Reports the origin-domain account behind the call currently being
/// executed, when that call was forwarded by the bridge. Implementations
/// are trusted: the host must guarantee that a non-`None` answer really
/// came through the bridge, and that it is scoped to that one call. A
/// concurrent call on another message must never see it.
pub trait CallContextResolver: Send + Sync {
    /// Origin-domain caller of the in-flight call, if bridge-forwarded.
    fn current_call_origin(&self) -> Option<CanonicalAddress>;
}

/// Value release - outbound port.
///
/// Invoked at most once per message identifier.
#[async_trait]
pub trait ValueReleaser: Send + Sync {
    /// Hand `amount` to `recipient` for message `id`.
    async fn release(
        &self,
        id: MessageId,
        recipient: CanonicalAddress,
        amount: u128,
    ) -> IsmResult<()>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock bridge gateway for testing.
#[derive(Default)]
pub struct MockBridgeGateway {
    /// Report as dead?
    pub dead: bool,
    /// Reject every proof with this reason.
    pub reject_reason: Option<String>,
    pub(crate) executions: Mutex<Vec<OutboxExecution>>,
}

impl MockBridgeGateway {
    /// Gateway that accepts every proof.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Gateway that rejects every proof.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_reason: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Executions submitted so far.
    pub fn executions(&self) -> Vec<OutboxExecution> {
        self.executions.lock().clone()
    }
}

#[async_trait]
impl BridgeGateway for MockBridgeGateway {
    async fn is_live(&self) -> bool {
        !self.dead
    }

    async fn execute_transaction(&self, execution: OutboxExecution) -> IsmResult<()> {
        self.executions.lock().push(execution);
        match &self.reject_reason {
            Some(reason) => Err(IsmError::BridgeRejected {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Mock call context with a fixed answer.
#[derive(Clone, Default)]
pub struct MockCallContext {
    /// Origin to report.
    pub origin: Option<CanonicalAddress>,
}

impl CallContextResolver for MockCallContext {
    fn current_call_origin(&self) -> Option<CanonicalAddress> {
        self.origin
    }
}
