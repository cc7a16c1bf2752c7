//! In-Memory Outbox Adapter
//!
//! Implements `BridgeGateway` and `CallContextResolver` the way a native
//! rollup bridge outbox behaves: posted roots, spent-index tracking, and
//! the sender of the call currently being forwarded.
//!
//! The forwarded sender lives in a task-local scoped to the forwarded
//! call's future. Other calls running concurrently never observe it.

use crate::algorithms::{
    calculate_root, call_item_hash, leaf_hash, verify_message_id_selector, OutboxCall,
    MAX_PROOF_DEPTH,
};
use crate::domain::{CanonicalAddress, Hash, IsmError, IsmResult, SELECTOR_LEN};
use crate::ports::outbound::{BridgeGateway, CallContextResolver, OutboxExecution};
use async_trait::async_trait;
use parking_lot::RwLock;
use primitive_types::U256;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

static NEXT_OUTBOX_ID: AtomicU64 = AtomicU64::new(1);

/// Call forwarded by an outbox, as seen by the code it invokes.
#[derive(Clone, Copy)]
struct ForwardedCall {
    outbox: u64,
    sender: CanonicalAddress,
}

tokio::task_local! {
    static FORWARDED_CALL: ForwardedCall;
}

/// Simulated native bridge outbox.
pub struct InMemoryOutbox {
    /// Roots posted by the rollup's state commitments.
    roots: RwLock<HashSet<Hash>>,
    /// Leaf indices already executed.
    spent: RwLock<HashSet<u64>>,
    /// Distinguishes this outbox's forwarded calls from another's.
    id: u64,
    live: bool,
}

impl InMemoryOutbox {
    /// Create a live outbox with no roots.
    pub fn new() -> Self {
        Self {
            roots: RwLock::new(HashSet::new()),
            spent: RwLock::new(HashSet::new()),
            id: NEXT_OUTBOX_ID.fetch_add(1, Ordering::Relaxed),
            live: true,
        }
    }

    /// An outbox with no code behind it.
    pub fn dead() -> Self {
        Self {
            live: false,
            ..Self::new()
        }
    }

    /// Post a rollup state root.
    pub fn post_root(&self, root: Hash) {
        info!("[qc-18] Outbox root posted {}", hex::encode(&root[..4]));
        self.roots.write().insert(root);
    }

    /// Check if a leaf index has been executed.
    pub fn is_spent(&self, index: u64) -> bool {
        self.spent.read().contains(&index)
    }

    /// Run `call` as a cross-domain call forwarded from `sender`.
    ///
    /// `sender` is the call origin only for code running inside `call`.
    pub async fn forward<F>(&self, sender: CanonicalAddress, call: F) -> F::Output
    where
        F: Future,
    {
        debug!("[qc-18] Outbox forwarding call from {}", sender);
        let forwarded = ForwardedCall {
            outbox: self.id,
            sender,
        };
        FORWARDED_CALL.scope(forwarded, call).await
    }

    fn check_and_spend(&self, execution: &OutboxExecution) -> IsmResult<()> {
        let depth = execution.proof.len();
        if depth > MAX_PROOF_DEPTH {
            return Err(rejected(format!("ProofTooLong({})", depth)));
        }
        if execution.index > U256::from(u64::MAX) {
            return Err(rejected("PathNotMinimal"));
        }
        let index = execution.index.as_u64();
        if depth < 64 && index >= (1u64 << depth) {
            return Err(rejected(format!("PathNotMinimal({}, {})", index, depth)));
        }

        let item = call_item_hash(&OutboxCall {
            sender: &execution.sender,
            target: &execution.target,
            origin_block: execution.origin_block,
            destination_block: execution.destination_block,
            origin_timestamp: execution.origin_timestamp,
            value: execution.value,
            data: &execution.payload,
        });
        let root = calculate_root(&execution.proof, index, leaf_hash(&item));
        if !self.roots.read().contains(&root) {
            return Err(rejected(format!("UnknownRoot({})", hex::encode(root))));
        }

        // The forwarded call reverts unless it targets verifyMessageId.
        if execution.payload.len() < SELECTOR_LEN
            || execution.payload[..SELECTOR_LEN] != verify_message_id_selector()
        {
            return Err(rejected("call reverted: unknown selector"));
        }

        if !self.spent.write().insert(index) {
            return Err(rejected(format!("AlreadySpent({})", index)));
        }
        Ok(())
    }
}

impl Default for InMemoryOutbox {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected(reason: impl Into<String>) -> IsmError {
    IsmError::BridgeRejected {
        reason: reason.into(),
    }
}

#[async_trait]
impl BridgeGateway for InMemoryOutbox {
    async fn is_live(&self) -> bool {
        self.live
    }

    async fn execute_transaction(&self, execution: OutboxExecution) -> IsmResult<()> {
        debug!(
            "[qc-18] Outbox executing index {} from {}",
            execution.index, execution.sender
        );
        self.check_and_spend(&execution)
    }
}

impl CallContextResolver for InMemoryOutbox {
    fn current_call_origin(&self) -> Option<CanonicalAddress> {
        FORWARDED_CALL
            .try_with(|call| (call.outbox == self.id).then_some(call.sender))
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{build_tree, encode_verify_message_id_payload};
    use crate::domain::MessageId;

    fn execution(index: u64, id: u8) -> OutboxExecution {
        OutboxExecution {
            proof: Vec::new(),
            index: U256::from(index),
            sender: CanonicalAddress::from_evm([0x11u8; 20]),
            target: CanonicalAddress::from_evm([0x22u8; 20]),
            origin_block: U256::from(100),
            destination_block: U256::from(200),
            origin_timestamp: U256::from(1_700_000_000u64),
            value: U256::zero(),
            payload: encode_verify_message_id_payload(&MessageId([id; 32])),
        }
    }

    fn leaf(execution: &OutboxExecution) -> Hash {
        leaf_hash(&call_item_hash(&OutboxCall {
            sender: &execution.sender,
            target: &execution.target,
            origin_block: execution.origin_block,
            destination_block: execution.destination_block,
            origin_timestamp: execution.origin_timestamp,
            value: execution.value,
            data: &execution.payload,
        }))
    }

    /// Four executions in one tree, root posted.
    fn posted() -> (InMemoryOutbox, Vec<OutboxExecution>) {
        let mut executions: Vec<_> = (0..4).map(|i| execution(i, i as u8)).collect();
        let leaves: Vec<_> = executions.iter().map(leaf).collect();
        let (root, branches) = build_tree(&leaves);
        for (execution, branch) in executions.iter_mut().zip(branches) {
            execution.proof = branch;
        }
        let outbox = InMemoryOutbox::new();
        outbox.post_root(root);
        (outbox, executions)
    }

    #[tokio::test]
    async fn test_valid_proof_executes_once() {
        let (outbox, executions) = posted();
        outbox.execute_transaction(executions[2].clone()).await.unwrap();
        assert!(outbox.is_spent(2));

        let err = outbox
            .execute_transaction(executions[2].clone())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("AlreadySpent"));
    }

    #[tokio::test]
    async fn test_unknown_root_rejected() {
        let (outbox, executions) = posted();
        let mut tampered = executions[1].clone();
        tampered.origin_block = U256::from(101);
        let err = outbox.execute_transaction(tampered).await.unwrap_err();
        assert!(err.to_string().contains("UnknownRoot"));
        assert!(!outbox.is_spent(1));
    }

    #[tokio::test]
    async fn test_index_must_fit_depth() {
        let (outbox, executions) = posted();
        let mut wide = executions[0].clone();
        wide.index = U256::from(4);
        let err = outbox.execute_transaction(wide).await.unwrap_err();
        assert!(err.to_string().contains("PathNotMinimal"));
    }

    #[tokio::test]
    async fn test_nonzero_value_changes_leaf() {
        let (outbox, executions) = posted();
        let mut paid = executions[0].clone();
        paid.value = U256::from(1);
        assert!(outbox.execute_transaction(paid).await.is_err());
    }

    #[tokio::test]
    async fn test_dead_outbox() {
        assert!(!InMemoryOutbox::dead().is_live().await);
        assert!(InMemoryOutbox::new().is_live().await);
    }

    #[tokio::test]
    async fn test_forwarded_origin_scoped_to_call() {
        let outbox = InMemoryOutbox::new();
        let hook = CanonicalAddress::from_evm([0x11u8; 20]);

        let inside = outbox
            .forward(hook, async { outbox.current_call_origin() })
            .await;
        assert_eq!(inside, Some(hook));
        assert!(outbox.current_call_origin().is_none());
    }

    #[tokio::test]
    async fn test_forwarded_origin_invisible_to_concurrent_calls() {
        let outbox = InMemoryOutbox::new();
        let hook = CanonicalAddress::from_evm([0x11u8; 20]);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let forwarded = outbox.forward(hook, async {
            let _ = rx.await;
            outbox.current_call_origin()
        });
        let bystander = async {
            let seen = outbox.current_call_origin();
            let _ = tx.send(());
            seen
        };
        let (inside, outside) = tokio::join!(forwarded, bystander);
        assert_eq!(inside, Some(hook));
        assert!(outside.is_none());
    }

    #[tokio::test]
    async fn test_forwarded_origin_bound_to_its_outbox() {
        let outbox = InMemoryOutbox::new();
        let other = InMemoryOutbox::new();
        let hook = CanonicalAddress::from_evm([0x11u8; 20]);

        let seen = outbox
            .forward(hook, async { other.current_call_origin() })
            .await;
        assert!(seen.is_none());
    }
}
