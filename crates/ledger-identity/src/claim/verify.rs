//! Claim signature verification.
//!
//! A third-party claim is valid when its signature over
//! `keccak256(subject ‖ topic ‖ data)` recovers to an account whose key
//! holds the CLAIM purpose on the issuer's own key store.

use crate::crypto::{hash, signing};
use crate::error::{IdentityError, Result};
use crate::identity::{Address, KeyAuthority, KeyId, Purpose};

/// Verify a claim signature against the issuer's keys.
///
/// Returns the id of the issuer key that signed the claim.
pub fn verify_claim_signature(
    issuer: &Address,
    issuer_keys: &dyn KeyAuthority,
    subject: &Address,
    topic: u64,
    data: &[u8],
    signature: &[u8],
) -> Result<KeyId> {
    let digest = hash::claim_digest(subject, topic, data);
    let signer = signing::recover_address(&digest, signature)?;
    let key = hash::key_id(&signer);

    if issuer_keys.key_has_purpose(&key, Purpose::Claim) {
        Ok(key)
    } else {
        log::warn!("claim for {subject} topic {topic}: signer {signer} holds no claim key on {issuer}");
        Err(IdentityError::InvalidSignature(format!(
            "signer {signer} holds no claim key on issuer {issuer}"
        )))
    }
}

/// Like [`verify_claim_signature`], for callers that only need a yes/no.
pub fn is_claim_signature_valid(
    issuer: &Address,
    issuer_keys: &dyn KeyAuthority,
    subject: &Address,
    topic: u64,
    data: &[u8],
    signature: &[u8],
) -> bool {
    verify_claim_signature(issuer, issuer_keys, subject, topic, data, signature).is_ok()
}
