//! # Algorithms Module
//!
//! Wire codecs and the outbox Merkle arithmetic.

pub mod message_codec;
pub mod metadata_codec;
pub mod outbox_merkle;

pub use message_codec::{
    decode_message, encode_message, message_id, message_id_from_bytes, MESSAGE_HEADER_LEN,
};
pub use metadata_codec::{
    decode_proof_metadata, encode_proof_metadata, encode_verify_message_id_payload,
    extract_claimed_message_id, verify_message_id_selector, VERIFY_MESSAGE_ID_SIGNATURE,
};
pub use outbox_merkle::{
    build_tree, calculate_root, call_item_hash, leaf_hash, OutboxCall, MAX_PROOF_DEPTH,
};
