//! # Proof Metadata Codec
//!
//! Metadata is the ABI encoding of
//!
//! ```text
//! (bytes32[] proof, uint256 index, address sender, address target,
//!  uint256 originBlock, uint256 destinationBlock, uint256 originTimestamp,
//!  bytes payload)
//! ```
//!
//! Eight head words; `proof` and `payload` are stored as byte offsets into
//! the buffer, each pointing at a length word followed by the contents.

use crate::domain::{
    invariant_payload_length, keccak256, CanonicalAddress, IsmError, IsmResult, MessageId,
    ProofMetadata, PAYLOAD_LEN, SELECTOR_LEN,
};
use primitive_types::U256;

const WORD: usize = 32;
const HEAD_LEN: usize = 8 * WORD;

/// Signature of the call the hook sends across the bridge.
pub const VERIFY_MESSAGE_ID_SIGNATURE: &str = "verifyMessageId(bytes32)";

/// Selector of `verifyMessageId(bytes32)`.
pub fn verify_message_id_selector() -> [u8; SELECTOR_LEN] {
    let hash = keccak256(VERIFY_MESSAGE_ID_SIGNATURE.as_bytes());
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&hash[..SELECTOR_LEN]);
    selector
}

/// Build the 36-byte payload committing to `id`.
pub fn encode_verify_message_id_payload(id: &MessageId) -> Vec<u8> {
    let mut payload = Vec::with_capacity(PAYLOAD_LEN);
    payload.extend_from_slice(&verify_message_id_selector());
    payload.extend_from_slice(id.as_bytes());
    payload
}

/// Trailing 32 bytes of the payload.
pub fn extract_claimed_message_id(metadata: &ProofMetadata) -> IsmResult<MessageId> {
    invariant_payload_length(&metadata.payload)?;
    let mut id = [0u8; 32];
    id.copy_from_slice(&metadata.payload[SELECTOR_LEN..]);
    Ok(MessageId(id))
}

/// Decode proof metadata.
///
/// Fails with `MalformedMetadata` on truncation, out-of-range offsets,
/// address words with dirty high bytes, or a payload that is not 36 bytes.
pub fn decode_proof_metadata(bytes: &[u8]) -> IsmResult<ProofMetadata> {
    if bytes.len() < HEAD_LEN {
        return Err(IsmError::malformed_metadata(format!(
            "{} bytes, head needs {}",
            bytes.len(),
            HEAD_LEN
        )));
    }

    let proof_offset = read_usize(bytes, 0, "proof offset")?;
    let leaf_index = read_uint(bytes, WORD)?;
    let claimed_sender = read_address(bytes, 2 * WORD, "sender")?;
    let claimed_target = read_address(bytes, 3 * WORD, "target")?;
    let origin_block = read_uint(bytes, 4 * WORD)?;
    let destination_block = read_uint(bytes, 5 * WORD)?;
    let origin_timestamp = read_uint(bytes, 6 * WORD)?;
    let payload_offset = read_usize(bytes, 7 * WORD, "payload offset")?;

    let merkle_proof = read_hash_array(bytes, proof_offset)?;
    let payload = read_bytes(bytes, payload_offset)?;
    invariant_payload_length(&payload)?;

    Ok(ProofMetadata {
        merkle_proof,
        leaf_index,
        claimed_sender,
        claimed_target,
        origin_block,
        destination_block,
        origin_timestamp,
        payload,
    })
}

/// Encode proof metadata in canonical ABI form.
pub fn encode_proof_metadata(metadata: &ProofMetadata) -> Vec<u8> {
    let proof_offset = HEAD_LEN;
    let payload_offset = proof_offset + WORD + metadata.merkle_proof.len() * WORD;
    let padded_payload = metadata.payload.len().div_ceil(WORD) * WORD;

    let mut out = Vec::with_capacity(payload_offset + WORD + padded_payload);
    out.extend_from_slice(&usize_word(proof_offset));
    out.extend_from_slice(&uint_word(metadata.leaf_index));
    out.extend_from_slice(metadata.claimed_sender.as_bytes());
    out.extend_from_slice(metadata.claimed_target.as_bytes());
    out.extend_from_slice(&uint_word(metadata.origin_block));
    out.extend_from_slice(&uint_word(metadata.destination_block));
    out.extend_from_slice(&uint_word(metadata.origin_timestamp));
    out.extend_from_slice(&usize_word(payload_offset));

    out.extend_from_slice(&usize_word(metadata.merkle_proof.len()));
    for node in &metadata.merkle_proof {
        out.extend_from_slice(node);
    }

    out.extend_from_slice(&usize_word(metadata.payload.len()));
    out.extend_from_slice(&metadata.payload);
    out.resize(payload_offset + WORD + padded_payload, 0);
    out
}

fn read_word(bytes: &[u8], at: usize) -> IsmResult<[u8; WORD]> {
    let end = at
        .checked_add(WORD)
        .ok_or_else(|| IsmError::malformed_metadata("offset overflow"))?;
    let slice = bytes.get(at..end).ok_or_else(|| {
        IsmError::malformed_metadata(format!("word at {} past end ({} bytes)", at, bytes.len()))
    })?;
    let mut word = [0u8; WORD];
    word.copy_from_slice(slice);
    Ok(word)
}

fn read_uint(bytes: &[u8], at: usize) -> IsmResult<U256> {
    Ok(U256::from_big_endian(&read_word(bytes, at)?))
}

fn read_usize(bytes: &[u8], at: usize, what: &str) -> IsmResult<usize> {
    let value = read_uint(bytes, at)?;
    if value > U256::from(bytes.len()) {
        return Err(IsmError::malformed_metadata(format!(
            "{} {} exceeds input length {}",
            what,
            value,
            bytes.len()
        )));
    }
    Ok(value.as_usize())
}

fn read_address(bytes: &[u8], at: usize, what: &str) -> IsmResult<CanonicalAddress> {
    let word = read_word(bytes, at)?;
    let address = CanonicalAddress(word);
    if address.to_evm().is_none() {
        return Err(IsmError::malformed_metadata(format!(
            "{} word has non-zero high bytes",
            what
        )));
    }
    Ok(address)
}

fn read_hash_array(bytes: &[u8], offset: usize) -> IsmResult<Vec<[u8; 32]>> {
    let len = read_usize(bytes, offset, "proof length")?;
    let start = offset + WORD;
    let span = len
        .checked_mul(WORD)
        .and_then(|n| n.checked_add(start))
        .ok_or_else(|| IsmError::malformed_metadata("proof length overflow"))?;
    if span > bytes.len() {
        return Err(IsmError::malformed_metadata(format!(
            "proof of {} nodes past end",
            len
        )));
    }
    (0..len).map(|i| read_word(bytes, start + i * WORD)).collect()
}

fn read_bytes(bytes: &[u8], offset: usize) -> IsmResult<Vec<u8>> {
    let len = read_usize(bytes, offset, "payload length")?;
    let start = offset + WORD;
    let end = start
        .checked_add(len)
        .ok_or_else(|| IsmError::malformed_metadata("payload length overflow"))?;
    bytes
        .get(start..end)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| IsmError::malformed_metadata(format!("payload of {} bytes past end", len)))
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn usize_word(value: usize) -> [u8; WORD] {
    uint_word(U256::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(payload: Vec<u8>) -> ProofMetadata {
        ProofMetadata {
            merkle_proof: vec![[1u8; 32], [2u8; 32], [3u8; 32]],
            leaf_index: U256::from(5),
            claimed_sender: CanonicalAddress::from_evm([0x11u8; 20]),
            claimed_target: CanonicalAddress::from_evm([0x22u8; 20]),
            origin_block: U256::from(1_000),
            destination_block: U256::from(2_000),
            origin_timestamp: U256::from(1_700_000_000u64),
            payload,
        }
    }

    #[test]
    fn test_selector_matches_solidity() {
        // cast sig "verifyMessageId(bytes32)"
        assert_eq!(hex::encode(verify_message_id_selector()), "f6a1b606");
    }

    #[test]
    fn test_head_layout() {
        let meta = sample(encode_verify_message_id_payload(&MessageId([9u8; 32])));
        let bytes = encode_proof_metadata(&meta);

        // proof offset, then payload offset after 3 nodes
        assert_eq!(U256::from_big_endian(&bytes[..32]), U256::from(256));
        assert_eq!(
            U256::from_big_endian(&bytes[224..256]),
            U256::from(256 + 32 + 3 * 32)
        );
        // 36-byte payload pads to 64
        assert_eq!(bytes.len(), 256 + 32 + 96 + 32 + 64);
    }

    #[test]
    fn test_decode_recovers_fields() {
        let meta = sample(encode_verify_message_id_payload(&MessageId([9u8; 32])));
        let decoded = decode_proof_metadata(&encode_proof_metadata(&meta)).unwrap();
        assert_eq!(decoded, meta);
        assert_eq!(
            extract_claimed_message_id(&decoded).unwrap(),
            MessageId([9u8; 32])
        );
    }

    #[test]
    fn test_payload_of_wrong_length_is_rejected() {
        for len in [0usize, 4, 32, 35, 37, 68] {
            let bytes = encode_proof_metadata(&sample(vec![0xEEu8; len]));
            let err = decode_proof_metadata(&bytes).unwrap_err();
            assert!(
                matches!(err, IsmError::MalformedMetadata { .. }),
                "len {}",
                len
            );
        }
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let meta = sample(encode_verify_message_id_payload(&MessageId([9u8; 32])));
        let bytes = encode_proof_metadata(&meta);
        for cut in [0usize, 31, 255, 300, bytes.len() - 40] {
            assert!(decode_proof_metadata(&bytes[..cut]).is_err(), "cut {}", cut);
        }
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let meta = sample(encode_verify_message_id_payload(&MessageId([9u8; 32])));
        let mut bytes = encode_proof_metadata(&meta);
        bytes[..32].copy_from_slice(&uint_word(U256::MAX));
        assert!(matches!(
            decode_proof_metadata(&bytes),
            Err(IsmError::MalformedMetadata { .. })
        ));
    }

    #[test]
    fn test_dirty_address_word_is_rejected() {
        let meta = sample(encode_verify_message_id_payload(&MessageId([9u8; 32])));
        let mut bytes = encode_proof_metadata(&meta);
        bytes[64] = 0x01;
        assert!(decode_proof_metadata(&bytes).is_err());
    }

    #[test]
    fn test_extract_requires_exact_payload() {
        let meta = sample(vec![0u8; 40]);
        assert!(extract_claimed_message_id(&meta).is_err());
    }
}
