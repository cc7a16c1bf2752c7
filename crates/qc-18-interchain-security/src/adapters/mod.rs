//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for interchain security.

mod escrow;
mod outbox;

pub use escrow::{EscrowReleaser, Release};
pub use outbox::InMemoryOutbox;
