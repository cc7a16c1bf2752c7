//! # QC-18 Interchain Security
//!
//! Native-bridge, message-id-authorized Interchain Security Module (ISM).
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Decide whether a cross-domain message delivered on this domain is
//! authentic, using the rollup's own native bridge as the trust anchor:
//! - **Direct path:** the authorized hook's `verifyMessageId` call is
//!   forwarded by the bridge; the identifier is recorded as verified.
//! - **Proof path:** a relayer supplies an outbox Merkle proof; the module
//!   checks sender and identifier, then replays it through the bridge.
//!
//! Either path verifies the message once; native value escrowed by the
//! direct call is released to the recipient exactly once.
//!
//! ## Security Properties
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Single principal | Both paths authorize the same canonical hook |
//! | Identifier binding | Proof payload must name the message being verified |
//! | Replay safety | Bridge outbox spends each proof once |
//! | Release-once | Side effect fires once per identifier |
//! | Call-scoped context | Forwarded origin visible only inside its own call |
//! | Uncancelled bridge calls | Slow outbox calls are logged, never abandoned |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-interchain-security/
//! ├── domain/          # Message, ProofMetadata, ledger, errors, invariants
//! ├── algorithms/      # Message codec, ABI metadata codec, outbox Merkle
//! ├── ports/           # InterchainSecurityModule, BridgeGateway, ...
//! ├── adapters/        # InMemoryOutbox, EscrowReleaser
//! └── service/         # NativeBridgeIsm dispatcher
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{EscrowReleaser, InMemoryOutbox, Release};
pub use algorithms::{
    build_tree, decode_message, decode_proof_metadata, encode_message, encode_proof_metadata,
    encode_verify_message_id_payload, message_id, message_id_from_bytes,
};
pub use config::{ConfigError, IsmConfig};
pub use domain::{
    Address, AuthorizationEvidence, CanonicalAddress, Domain, Hash, IsmError, IsmResult, Message,
    MessageId, ModuleType, ProofMetadata, VerificationLedger, VerificationPath,
    VerificationRecord, VerificationStatus,
};
pub use ports::{
    BridgeGateway, CallContextResolver, InterchainSecurityModule, OutboxExecution, ValueReleaser,
};
pub use service::{AuthorizationStore, NativeBridgeIsm, NativeBridgeProofVerifier};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
