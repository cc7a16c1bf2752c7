//! Native Bridge Proof Verifier
//!
//! Checks a decoded proof against the authorized hook and the message
//! being verified, then hands it to the bridge outbox. Merkle inclusion and
//! root validity are the bridge's decision, not ours.
//!
//! The bridge call is never abandoned: a slow bridge is logged and still
//! awaited, so its verdict always reaches the dispatcher.

use super::authorization::AuthorizationStore;
use crate::algorithms::extract_claimed_message_id;
use crate::domain::{invariant_message_id_match, IsmError, IsmResult, MessageId, ProofMetadata};
use crate::ports::outbound::{BridgeGateway, CallContextResolver, OutboxExecution};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Replays proofs through the native bridge.
pub struct NativeBridgeProofVerifier<G> {
    gateway: Arc<G>,
    slow_call: Duration,
}

impl<G> NativeBridgeProofVerifier<G>
where
    G: BridgeGateway,
{
    /// Create a verifier that warns when an outbox call outlasts `slow_call`.
    pub fn new(gateway: Arc<G>, slow_call: Duration) -> Self {
        Self { gateway, slow_call }
    }

    /// Verify `metadata` proves `expected_id`, then execute it on the bridge.
    ///
    /// Each step is a hard precondition; nothing is submitted unless the
    /// sender and identifier checks pass.
    pub async fn verify_and_execute<C>(
        &self,
        metadata: &ProofMetadata,
        expected_id: &MessageId,
        auth: &AuthorizationStore<C>,
    ) -> IsmResult<()>
    where
        C: CallContextResolver,
    {
        // 1. Sender
        if !auth.matches_hook(&metadata.claimed_sender) {
            return Err(IsmError::SenderMismatch {
                expected: auth.hook(),
                actual: metadata.claimed_sender,
            });
        }

        // 2. Message id
        let claimed_id = extract_claimed_message_id(metadata)?;
        invariant_message_id_match(expected_id, &claimed_id)?;

        // 3. Bridge
        debug!(
            "[qc-18] Submitting proof for {} (index {}, depth {})",
            expected_id.short(),
            metadata.leaf_index,
            metadata.merkle_proof.len()
        );
        let call = self
            .gateway
            .execute_transaction(OutboxExecution::from_metadata(metadata));
        tokio::pin!(call);
        match tokio::time::timeout(self.slow_call, &mut call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "[qc-18] Bridge call for {} pending after {:?}, still waiting",
                    expected_id.short(),
                    self.slow_call
                );
                call.await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::encode_verify_message_id_payload;
    use crate::domain::CanonicalAddress;
    use crate::ports::outbound::{MockBridgeGateway, MockCallContext};
    use async_trait::async_trait;
    use primitive_types::U256;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn hook() -> CanonicalAddress {
        CanonicalAddress::from_evm([0x11u8; 20])
    }

    fn metadata(sender: CanonicalAddress, id: &MessageId) -> ProofMetadata {
        ProofMetadata {
            merkle_proof: vec![[7u8; 32]],
            leaf_index: U256::zero(),
            claimed_sender: sender,
            claimed_target: CanonicalAddress::from_evm([0x22u8; 20]),
            origin_block: U256::from(1),
            destination_block: U256::from(2),
            origin_timestamp: U256::from(3),
            payload: encode_verify_message_id_payload(id),
        }
    }

    async fn setup(
        gateway: MockBridgeGateway,
    ) -> (
        NativeBridgeProofVerifier<MockBridgeGateway>,
        Arc<MockBridgeGateway>,
        AuthorizationStore<MockCallContext>,
    ) {
        let gateway = Arc::new(gateway);
        let auth = AuthorizationStore::new(
            gateway.as_ref(),
            Arc::new(MockCallContext::default()),
            hook(),
        )
        .await
        .unwrap();
        let verifier = NativeBridgeProofVerifier::new(gateway.clone(), Duration::from_secs(5));
        (verifier, gateway, auth)
    }

    #[tokio::test]
    async fn test_valid_proof_is_submitted_with_zero_value() {
        let (verifier, gateway, auth) = setup(MockBridgeGateway::accepting()).await;
        let id = MessageId([5u8; 32]);
        verifier
            .verify_and_execute(&metadata(hook(), &id), &id, &auth)
            .await
            .unwrap();

        let executions = gateway.executions();
        assert_eq!(executions.len(), 1);
        assert!(executions[0].value.is_zero());
    }

    #[tokio::test]
    async fn test_sender_mismatch_never_reaches_bridge() {
        let (verifier, gateway, auth) = setup(MockBridgeGateway::accepting()).await;
        let id = MessageId([5u8; 32]);
        let other = CanonicalAddress::from_evm([0x99u8; 20]);
        let err = verifier
            .verify_and_execute(&metadata(other, &id), &id, &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, IsmError::SenderMismatch { .. }));
        assert!(gateway.executions().is_empty());
    }

    #[tokio::test]
    async fn test_id_mismatch_never_reaches_bridge() {
        let (verifier, gateway, auth) = setup(MockBridgeGateway::accepting()).await;
        let err = verifier
            .verify_and_execute(
                &metadata(hook(), &MessageId([5u8; 32])),
                &MessageId([6u8; 32]),
                &auth,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, IsmError::MessageIdMismatch { .. }));
        assert!(gateway.executions().is_empty());
    }

    #[tokio::test]
    async fn test_bad_payload_never_reaches_bridge() {
        let (verifier, gateway, auth) = setup(MockBridgeGateway::accepting()).await;
        let id = MessageId([5u8; 32]);
        let mut meta = metadata(hook(), &id);
        meta.payload.push(0);
        let err = verifier
            .verify_and_execute(&meta, &id, &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, IsmError::MalformedMetadata { .. }));
        assert!(gateway.executions().is_empty());
    }

    #[tokio::test]
    async fn test_bridge_rejection_propagates_unchanged() {
        let (verifier, _gateway, auth) =
            setup(MockBridgeGateway::rejecting("AlreadySpent(0)")).await;
        let id = MessageId([5u8; 32]);
        let err = verifier
            .verify_and_execute(&metadata(hook(), &id), &id, &auth)
            .await
            .unwrap_err();
        match err {
            IsmError::BridgeRejected { reason } => assert_eq!(reason, "AlreadySpent(0)"),
            other => panic!("unexpected {:?}", other),
        }
    }

    /// Commits at once, answers an hour later.
    struct LateGateway {
        committed: AtomicBool,
        verdict: Option<String>,
    }

    #[async_trait]
    impl BridgeGateway for LateGateway {
        async fn is_live(&self) -> bool {
            true
        }

        async fn execute_transaction(&self, _execution: OutboxExecution) -> IsmResult<()> {
            self.committed.store(true, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            match &self.verdict {
                Some(reason) => Err(IsmError::BridgeRejected {
                    reason: reason.clone(),
                }),
                None => Ok(()),
            }
        }
    }

    async fn late_setup(
        verdict: Option<String>,
    ) -> (
        NativeBridgeProofVerifier<LateGateway>,
        Arc<LateGateway>,
        AuthorizationStore<MockCallContext>,
    ) {
        let gateway = Arc::new(LateGateway {
            committed: AtomicBool::new(false),
            verdict,
        });
        let auth = AuthorizationStore::new(
            gateway.as_ref(),
            Arc::new(MockCallContext::default()),
            hook(),
        )
        .await
        .unwrap();
        let verifier = NativeBridgeProofVerifier::new(gateway.clone(), Duration::from_secs(30));
        (verifier, gateway, auth)
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_bridge_is_awaited_to_its_verdict() {
        let (verifier, gateway, auth) = late_setup(None).await;
        let id = MessageId([5u8; 32]);
        verifier
            .verify_and_execute(&metadata(hook(), &id), &id, &auth)
            .await
            .unwrap();
        assert!(gateway.committed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_bridge_rejection_propagates_unchanged() {
        let (verifier, _gateway, auth) = late_setup(Some("UnknownRoot".to_string())).await;
        let id = MessageId([5u8; 32]);
        let err = verifier
            .verify_and_execute(&metadata(hook(), &id), &id, &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, IsmError::BridgeRejected { .. }));
    }
}
