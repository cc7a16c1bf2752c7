//! Interchain Security Service - the ISM dispatcher
//!
//! Single entry point for message verification. Per message identifier:
//!
//! ```text
//! [UNVERIFIED] ──direct call──→ [VERIFIED] ──release (once)──→ [RELEASED]
//!       │                             ↑
//!       └───proof replayed via bridge─┘
//! ```

mod authorization;
mod locks;
mod proof_verifier;

pub use authorization::AuthorizationStore;
pub use locks::{IdentifierGuard, IdentifierLocks};
pub use proof_verifier::NativeBridgeProofVerifier;

use crate::algorithms::{decode_message, decode_proof_metadata, message_id, message_id_from_bytes};
use crate::config::IsmConfig;
use crate::domain::{
    AuthorizationEvidence, IsmError, IsmResult, Message, MessageId, ModuleType,
    VerificationLedger, VerificationPath, VerificationRecord,
};
use crate::metrics;
use crate::ports::inbound::InterchainSecurityModule;
use crate::ports::outbound::{BridgeGateway, CallContextResolver, ValueReleaser};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Native-bridge, message-id-authorized ISM.
///
/// One instance guards one (origin rollup, bridge) pair and owns its
/// ledger for its whole lifetime.
pub struct NativeBridgeIsm<G, C, R>
where
    G: BridgeGateway,
    C: CallContextResolver,
    R: ValueReleaser,
{
    config: IsmConfig,
    auth: AuthorizationStore<C>,
    verifier: NativeBridgeProofVerifier<G>,
    releaser: Arc<R>,
    ledger: Arc<RwLock<VerificationLedger>>,
    locks: IdentifierLocks,
}

impl<G, C, R> NativeBridgeIsm<G, C, R>
where
    G: BridgeGateway,
    C: CallContextResolver,
    R: ValueReleaser,
{
    /// Create a module instance.
    ///
    /// Fails with `InvalidConfig` for a bad hook or slow-call threshold, and with
    /// `InvalidGateway` if the gateway is not live.
    pub async fn new(
        config: IsmConfig,
        gateway: Arc<G>,
        context: Arc<C>,
        releaser: Arc<R>,
    ) -> IsmResult<Self> {
        config.validate().map_err(|e| IsmError::InvalidConfig {
            reason: e.to_string(),
        })?;
        let hook = config.hook().map_err(|e| IsmError::InvalidConfig {
            reason: e.to_string(),
        })?;

        let auth = AuthorizationStore::new(gateway.as_ref(), context, hook).await?;
        let verifier = NativeBridgeProofVerifier::new(gateway, config.bridge_slow_call());

        info!("[qc-18] ISM ready, authorized hook {}", hook);

        Ok(Self {
            config,
            auth,
            verifier,
            releaser,
            ledger: Arc::new(RwLock::new(VerificationLedger::new())),
            locks: IdentifierLocks::new(),
        })
    }

    /// The authorized hook.
    pub fn authorized_hook(&self) -> crate::domain::CanonicalAddress {
        self.auth.hook()
    }

    /// Number of verified identifiers.
    pub fn verified_count(&self) -> usize {
        self.ledger.read().verified_count()
    }

    async fn verify_inner(
        &self,
        metadata: &[u8],
        message: &[u8],
        correlation_id: Uuid,
    ) -> IsmResult<(MessageId, VerificationPath)> {
        let message = decode_message(message)?;
        self.check_domains(&message)?;
        let id = message_id(&message);

        let _section = self.locks.lock(id).await;

        let already_verified = self.ledger.read().is_verified(&id);
        if already_verified {
            debug!("[qc-18] {} {} already verified", correlation_id, id.short());
            self.release_once(&message, id).await?;
            return Ok((id, VerificationPath::Cached));
        }

        let evidence = self.resolve_evidence(metadata)?;
        if let AuthorizationEvidence::ProofReplay(proof) = &evidence {
            self.verifier
                .verify_and_execute(proof, &id, &self.auth)
                .await?;
        }

        self.ledger.write().mark_verified(id);
        self.release_once(&message, id).await?;
        Ok((id, evidence.path()))
    }

    /// Direct context wins; otherwise the metadata must decode as a proof.
    fn resolve_evidence(&self, metadata: &[u8]) -> IsmResult<AuthorizationEvidence> {
        if self.auth.is_authorized_context() {
            return Ok(AuthorizationEvidence::DirectContext);
        }
        let proof = decode_proof_metadata(metadata)?;
        Ok(AuthorizationEvidence::ProofReplay(proof))
    }

    /// Fire the release side effect if it has not fired yet.
    ///
    /// Runs inside the identifier's critical section, so the check and the
    /// flag update cannot interleave with another call on the same id.
    async fn release_once(&self, message: &Message, id: MessageId) -> IsmResult<()> {
        let pending = self.ledger.read().pending_release(&id);
        let Some(amount) = pending else {
            return Ok(());
        };

        self.releaser.release(id, message.recipient, amount).await?;
        self.ledger.write().mark_released(id);
        metrics::record_release();
        Ok(())
    }

    fn check_domains(&self, message: &Message) -> IsmResult<()> {
        if self.config.origin_domain != 0 && message.origin != self.config.origin_domain {
            return Err(IsmError::malformed_message(format!(
                "origin domain {} (expected {})",
                message.origin, self.config.origin_domain
            )));
        }
        if self.config.local_domain != 0 && message.destination != self.config.local_domain {
            return Err(IsmError::malformed_message(format!(
                "destination domain {} (expected {})",
                message.destination, self.config.local_domain
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<G, C, R> InterchainSecurityModule for NativeBridgeIsm<G, C, R>
where
    G: BridgeGateway + 'static,
    C: CallContextResolver + 'static,
    R: ValueReleaser + 'static,
{
    fn module_type(&self) -> ModuleType {
        ModuleType::Null
    }

    async fn verify(&self, metadata: &[u8], message: &[u8]) -> IsmResult<bool> {
        let correlation_id = Uuid::new_v4();
        match self.verify_inner(metadata, message, correlation_id).await {
            Ok((id, path)) => {
                metrics::record_verification(path.label());
                info!(
                    "[qc-18] {} verified {} via {}",
                    correlation_id,
                    id.short(),
                    path.label()
                );
                Ok(true)
            }
            Err(e) => {
                metrics::record_rejection(e.reason_label());
                warn!("[qc-18] {} verification failed: {}", correlation_id, e);
                Err(e)
            }
        }
    }

    async fn verify_message_id(&self, id: MessageId, value: u128) -> IsmResult<()> {
        if !self.auth.is_authorized_context() {
            metrics::record_rejection(IsmError::Unauthorized.reason_label());
            warn!("[qc-18] verifyMessageId for {} from unauthorized context", id.short());
            return Err(IsmError::Unauthorized);
        }

        let _section = self.locks.lock(id).await;
        let escrowed = self.ledger.write().add_escrow(id, value);
        if let Err(e) = escrowed {
            metrics::record_rejection(e.reason_label());
            warn!("[qc-18] verifyMessageId for {} rejected: {}", id.short(), e);
            return Err(e);
        }
        self.ledger.write().mark_verified(id);

        metrics::record_verification(VerificationPath::Direct.label());
        info!(
            "[qc-18] {} verified by bridge call, escrowed {}",
            id.short(),
            value
        );
        Ok(())
    }

    fn is_verified(&self, message: &[u8]) -> IsmResult<bool> {
        let id = message_id_from_bytes(message)?;
        Ok(self.ledger.read().is_verified(&id))
    }

    fn status(&self, id: &MessageId) -> VerificationRecord {
        self.ledger.read().record(id)
    }
}
