//! secp256k1 key pairs for signers and attestors.
//!
//! A signer is an externally-owned account: its address is the last 20
//! bytes of the Keccak-256 hash of its uncompressed public key, and its
//! key id on an identity's key store is `keccak256(address)`.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::crypto::hash;
use crate::error::{IdentityError, Result};
use crate::identity::{Address, KeyId};

/// A secp256k1 key pair used to authenticate transactions and sign claims.
///
/// The secret scalar is zeroized when the signing key is dropped.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Secp256k1KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from a raw 32-byte secret scalar.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| IdentityError::InvalidKey(format!("invalid secp256k1 secret: {e}")))?;
        let verifying_key = *signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the secret scalar bytes. Caller must zeroize after use.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// Account address controlled by this key pair.
    pub fn address(&self) -> Address {
        address_of(&self.verifying_key)
    }

    /// Key id under which this signer is registered on a key store.
    pub fn key_id(&self) -> KeyId {
        hash::key_id(&self.address())
    }
}

/// Derive the account address of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = hash::keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}
