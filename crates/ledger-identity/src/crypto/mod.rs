//! Cryptographic primitives for ledger-identity.
//!
//! This module provides:
//! - Keccak-256 hashing and the packed encodings of key ids, claim ids
//!   and claim digests
//! - secp256k1 key pairs for signers and attestors
//! - Recoverable ECDSA signing and address recovery
//! - Passphrase sealing (Argon2id, HKDF-SHA256, ChaCha20-Poly1305)

pub mod hash;
pub mod keys;
pub mod sealing;
pub mod signing;

pub use hash::{claim_digest, claim_id, key_id, keccak256};
pub use keys::Secp256k1KeyPair;
pub use signing::{recover_address, sign_claim, sign_digest};
