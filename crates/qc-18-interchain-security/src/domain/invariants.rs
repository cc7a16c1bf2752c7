//! # Domain Invariants
//!
//! Business rules for Interchain Security. Each returns the specific
//! error the caller must propagate.

use super::errors::{IsmError, IsmResult};
use super::value_objects::{CanonicalAddress, MessageId};

/// Selector width at the head of the proof payload.
pub const SELECTOR_LEN: usize = 4;

/// Payload width: selector followed by a 32-byte message id.
pub const PAYLOAD_LEN: usize = SELECTOR_LEN + 32;

/// Invariant: the proof was emitted by the authorized hook.
pub fn invariant_hook_match(
    hook: &CanonicalAddress,
    candidate: &CanonicalAddress,
) -> IsmResult<()> {
    if hook != candidate {
        return Err(IsmError::SenderMismatch {
            expected: *hook,
            actual: *candidate,
        });
    }
    Ok(())
}

/// Invariant: payload is exactly selector + message id.
pub fn invariant_payload_length(payload: &[u8]) -> IsmResult<()> {
    if payload.len() != PAYLOAD_LEN {
        return Err(IsmError::malformed_metadata(format!(
            "payload length {} (expected {})",
            payload.len(),
            PAYLOAD_LEN
        )));
    }
    Ok(())
}

/// Invariant: the proof commits to the message being verified.
pub fn invariant_message_id_match(expected: &MessageId, claimed: &MessageId) -> IsmResult<()> {
    if expected != claimed {
        return Err(IsmError::MessageIdMismatch {
            expected: *expected,
            actual: *claimed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_match() {
        let hook = CanonicalAddress::from_evm([0x11u8; 20]);
        assert!(invariant_hook_match(&hook, &hook).is_ok());
    }

    #[test]
    fn test_hook_mismatch() {
        let hook = CanonicalAddress::from_evm([0x11u8; 20]);
        let other = CanonicalAddress::from_evm([0x22u8; 20]);
        assert!(matches!(
            invariant_hook_match(&hook, &other),
            Err(IsmError::SenderMismatch { .. })
        ));
    }

    #[test]
    fn test_hook_match_is_width_sensitive() {
        // Same low 20 bytes, dirty high bytes: a different principal.
        let hook = CanonicalAddress::from_evm([0x11u8; 20]);
        let mut dirty = hook;
        dirty.0[0] = 0xFF;
        assert!(invariant_hook_match(&hook, &dirty).is_err());
    }

    #[test]
    fn test_payload_length() {
        assert!(invariant_payload_length(&[0u8; 36]).is_ok());
        assert!(invariant_payload_length(&[0u8; 35]).is_err());
        assert!(invariant_payload_length(&[0u8; 37]).is_err());
        assert!(invariant_payload_length(&[]).is_err());
    }

    #[test]
    fn test_message_id_match() {
        let a = MessageId([1u8; 32]);
        let b = MessageId([2u8; 32]);
        assert!(invariant_message_id_match(&a, &a).is_ok());
        assert!(matches!(
            invariant_message_id_match(&a, &b),
            Err(IsmError::MessageIdMismatch { .. })
        ));
    }
}
