//! Signer key files: encrypted secp256k1 keys of externally owned accounts.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "lid-key-v1",
//!     "address": "0x…",
//!     "encryption": {
//!         "algorithm": "chacha20-poly1305",
//!         "kdf": "argon2id",
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>"
//!     },
//!     "encrypted_key": "<base64-ciphertext>"
//! }
//! ```
//!
//! The address is stored in plaintext so a signer can be listed and used
//! as a transaction target without the passphrase.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::sealing::{self, Sealed, NONCE_LEN, SALT_LEN};
use crate::crypto::Secp256k1KeyPair;
use crate::error::{IdentityError, Result};
use crate::identity::Address;

use super::write_atomic;

const KEY_VERSION: u32 = 1;
const KEY_FORMAT: &str = "lid-key-v1";
const KEY_ALGORITHM: &str = "chacha20-poly1305";
const KEY_KDF: &str = "argon2id";

/// HKDF context for signer keys. Must remain stable across versions.
const SIGNER_ENCRYPTION_CONTEXT: &str = "signer-encryption";

/// Top-level structure of a signer key file.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignerFile {
    pub version: u32,
    pub format: String,
    /// Account address of the key.
    pub address: Address,
    pub encryption: EncryptionMetadata,
    /// Base64-encoded ciphertext of the 32-byte secret scalar.
    pub encrypted_key: String,
}

/// Encryption parameters stored alongside the ciphertext.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub algorithm: String,
    pub kdf: String,
    /// Base64-encoded Argon2id salt (16 bytes).
    pub salt: String,
    /// Base64-encoded ChaCha20-Poly1305 nonce (12 bytes).
    pub nonce: String,
}

fn decode_fixed<const N: usize>(value: &str, what: &str) -> Result<[u8; N]> {
    STANDARD
        .decode(value)
        .map_err(|e| IdentityError::InvalidFileFormat(format!("invalid {what} base64: {e}")))?
        .try_into()
        .map_err(|_| IdentityError::InvalidFileFormat(format!("{what} must be {N} bytes")))
}

fn read_file(path: &Path) -> Result<SignerFile> {
    let bytes = std::fs::read(path)?;
    let file: SignerFile = serde_json::from_slice(&bytes)
        .map_err(|e| IdentityError::InvalidFileFormat(format!("failed to parse key file: {e}")))?;
    if file.version != KEY_VERSION || file.format != KEY_FORMAT {
        return Err(IdentityError::InvalidFileFormat(format!(
            "unsupported key file version={} format={}",
            file.version, file.format
        )));
    }
    Ok(file)
}

/// Encrypt a signer key under `passphrase` and write it to `path`.
pub fn save_signer(key_pair: &Secp256k1KeyPair, path: &Path, passphrase: &str) -> Result<()> {
    let mut secret = key_pair.secret_bytes();
    let sealed = sealing::seal(passphrase.as_bytes(), SIGNER_ENCRYPTION_CONTEXT, &secret);
    secret.zeroize();
    let sealed = sealed?;

    let file = SignerFile {
        version: KEY_VERSION,
        format: KEY_FORMAT.to_string(),
        address: key_pair.address(),
        encryption: EncryptionMetadata {
            algorithm: KEY_ALGORITHM.to_string(),
            kdf: KEY_KDF.to_string(),
            salt: STANDARD.encode(sealed.salt),
            nonce: STANDARD.encode(sealed.nonce),
        },
        encrypted_key: STANDARD.encode(&sealed.ciphertext),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| IdentityError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Decrypt a signer key.
pub fn load_signer(path: &Path, passphrase: &str) -> Result<Secp256k1KeyPair> {
    let file = read_file(path)?;
    let sealed = Sealed {
        salt: decode_fixed::<SALT_LEN>(&file.encryption.salt, "salt")?,
        nonce: decode_fixed::<NONCE_LEN>(&file.encryption.nonce, "nonce")?,
        ciphertext: STANDARD.decode(&file.encrypted_key).map_err(|e| {
            IdentityError::InvalidFileFormat(format!("invalid ciphertext base64: {e}"))
        })?,
    };

    let mut plaintext = sealing::open(passphrase.as_bytes(), SIGNER_ENCRYPTION_CONTEXT, &sealed)?;
    let secret: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let mut secret =
        secret.map_err(|_| IdentityError::InvalidKey("signer key must be 32 bytes".into()))?;
    let key_pair = Secp256k1KeyPair::from_secret_bytes(&secret);
    secret.zeroize();
    let key_pair = key_pair?;

    if key_pair.address() != file.address {
        return Err(IdentityError::InvalidFileFormat(format!(
            "key file address {} does not match its key",
            file.address
        )));
    }
    Ok(key_pair)
}

/// Read a signer's address without decrypting its key.
pub fn read_signer_address(path: &Path) -> Result<Address> {
    Ok(read_file(path)?.address)
}
