//! # Message Codec
//!
//! Packed message layout, big-endian integers:
//!
//! ```text
//! version(1) | nonce(4) | origin(4) | sender(32) | destination(4) | recipient(32) | body(..)
//! ```

use crate::domain::{keccak256, CanonicalAddress, IsmError, IsmResult, Message, MessageId};

/// Fixed header width preceding the body.
pub const MESSAGE_HEADER_LEN: usize = 1 + 4 + 4 + 32 + 4 + 32;

const NONCE_OFFSET: usize = 1;
const ORIGIN_OFFSET: usize = 5;
const SENDER_OFFSET: usize = 9;
const DESTINATION_OFFSET: usize = 41;
const RECIPIENT_OFFSET: usize = 45;
const BODY_OFFSET: usize = MESSAGE_HEADER_LEN;

/// Encode a message.
pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut out = Vec::with_capacity(MESSAGE_HEADER_LEN + message.body.len());
    out.push(message.version);
    out.extend_from_slice(&message.nonce.to_be_bytes());
    out.extend_from_slice(&message.origin.to_be_bytes());
    out.extend_from_slice(message.sender.as_bytes());
    out.extend_from_slice(&message.destination.to_be_bytes());
    out.extend_from_slice(message.recipient.as_bytes());
    out.extend_from_slice(&message.body);
    out
}

/// Decode a message.
pub fn decode_message(bytes: &[u8]) -> IsmResult<Message> {
    if bytes.len() < MESSAGE_HEADER_LEN {
        return Err(IsmError::malformed_message(format!(
            "{} bytes, header needs {}",
            bytes.len(),
            MESSAGE_HEADER_LEN
        )));
    }

    Ok(Message {
        version: bytes[0],
        nonce: read_u32(bytes, NONCE_OFFSET),
        origin: read_u32(bytes, ORIGIN_OFFSET),
        sender: read_address(bytes, SENDER_OFFSET),
        destination: read_u32(bytes, DESTINATION_OFFSET),
        recipient: read_address(bytes, RECIPIENT_OFFSET),
        body: bytes[BODY_OFFSET..].to_vec(),
    })
}

/// Content-addressed identifier of a message.
pub fn message_id(message: &Message) -> MessageId {
    MessageId(keccak256(&encode_message(message)))
}

/// Identifier straight from encoded bytes (same result as decode + `message_id`).
pub fn message_id_from_bytes(bytes: &[u8]) -> IsmResult<MessageId> {
    if bytes.len() < MESSAGE_HEADER_LEN {
        return Err(IsmError::malformed_message(format!(
            "{} bytes, header needs {}",
            bytes.len(),
            MESSAGE_HEADER_LEN
        )));
    }
    Ok(MessageId(keccak256(bytes)))
}

// Callers have already checked the header length.
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}

fn read_address(bytes: &[u8], offset: usize) -> CanonicalAddress {
    let mut word = [0u8; 32];
    word.copy_from_slice(&bytes[offset..offset + 32]);
    CanonicalAddress(word)
}
