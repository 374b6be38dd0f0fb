//! Keccak-256 hashing and packed encodings.
//!
//! Encodings follow Solidity's `abi.encodePacked`: addresses are their raw
//! 20 bytes and integer topics are `uint256`, i.e. 32 bytes big-endian.
//! Signatures produced by standard Ethereum tooling over these digests
//! therefore verify here unchanged.

use sha3::{Digest, Keccak256};

use crate::claim::ClaimId;
use crate::identity::{Address, KeyId};

/// Prefix applied by `personal_sign` / `eth_sign` to a 32-byte message.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Keccak-256 over the concatenation of several byte slices.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Encode an integer topic as a `uint256` word.
pub fn uint256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Key identifier for an account: `keccak256(address)`.
pub fn key_id(address: &Address) -> KeyId {
    KeyId(keccak256(address.as_bytes()))
}

/// Claim identifier: `keccak256(issuer ‖ topic)`.
pub fn claim_id(issuer: &Address, topic: u64) -> ClaimId {
    ClaimId(keccak256_concat(&[issuer.as_bytes(), &uint256_word(topic)]))
}

/// Digest an attestor signs for a claim: `keccak256(subject ‖ topic ‖ data)`.
pub fn claim_digest(subject: &Address, topic: u64, data: &[u8]) -> [u8; 32] {
    keccak256_concat(&[subject.as_bytes(), &uint256_word(topic), data])
}

/// Hash a 32-byte digest the way `personal_sign` does before signing.
pub fn personal_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, digest])
}
