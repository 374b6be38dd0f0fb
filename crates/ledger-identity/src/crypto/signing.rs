//! Recoverable ECDSA signatures over 32-byte digests.
//!
//! Signatures are 65 bytes, `r ‖ s ‖ v`, with `v` in `{27, 28}` as
//! produced by `personal_sign`. Recovery also accepts raw `{0, 1}`.
//! The digest is always wrapped with the personal-message prefix before
//! signing and before recovery.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::crypto::hash;
use crate::crypto::keys::{address_of, Secp256k1KeyPair};
use crate::error::{IdentityError, Result};
use crate::identity::Address;

/// Length of an encoded recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Sign a 32-byte digest as a personal message.
pub fn sign_digest(key_pair: &Secp256k1KeyPair, digest: &[u8; 32]) -> Result<Vec<u8>> {
    let prehash = hash::personal_message_hash(digest);
    let (signature, recovery_id) = key_pair
        .signing_key()
        .sign_prehash_recoverable(&prehash)
        .map_err(|e| IdentityError::InvalidKey(format!("signing failed: {e}")))?;

    let mut out = Vec::with_capacity(SIGNATURE_LEN);
    out.extend_from_slice(&signature.to_bytes());
    out.push(27 + recovery_id.to_byte());
    Ok(out)
}

/// Sign the claim digest `keccak256(subject ‖ topic ‖ data)`.
///
/// This is what an attestor runs off-ledger before the subject submits
/// the claim to its own claim store.
pub fn sign_claim(
    key_pair: &Secp256k1KeyPair,
    subject: &Address,
    topic: u64,
    data: &[u8],
) -> Result<Vec<u8>> {
    sign_digest(key_pair, &hash::claim_digest(subject, topic, data))
}

/// Recover the address that signed `digest` as a personal message.
///
/// Any malformed input is reported as `InvalidSignature`.
pub fn recover_address(digest: &[u8; 32], signature: &[u8]) -> Result<Address> {
    if signature.len() != SIGNATURE_LEN {
        return Err(IdentityError::InvalidSignature(format!(
            "signature must be {SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }

    let v = match signature[64] {
        27 | 28 => signature[64] - 27,
        0 | 1 => signature[64],
        other => {
            return Err(IdentityError::InvalidSignature(format!(
                "invalid recovery byte {other}"
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| IdentityError::InvalidSignature("invalid recovery id".into()))?;

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| IdentityError::InvalidSignature(format!("malformed signature: {e}")))?;

    let prehash = hash::personal_message_hash(digest);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|e| IdentityError::InvalidSignature(format!("recovery failed: {e}")))?;

    Ok(address_of(&key))
}
