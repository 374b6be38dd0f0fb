//! Passphrase sealing for secrets at rest.
//!
//! passphrase → Argon2id(passphrase, salt) → master key
//! HKDF-SHA256(master key, context) → sealing key
//! ChaCha20-Poly1305(sealing key, nonce) → ciphertext
//!
//! Used for signer key files. The context string separates keys sealed for
//! different purposes even under the same passphrase and salt.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{IdentityError, Result};

const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

/// Salt length for Argon2id.
pub const SALT_LEN: usize = 16;
/// Nonce length for ChaCha20-Poly1305.
pub const NONCE_LEN: usize = 12;

/// Output of [`seal`]: everything needed to open the secret again.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Fill a fixed-size array from the OS-seeded thread RNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

fn passphrase_key(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> Result<[u8; 32]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| IdentityError::DerivationFailed(format!("Argon2 params: {e}")))?;
    let mut out = [0u8; 32];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(passphrase, salt, &mut out)
        .map_err(|e| IdentityError::DerivationFailed(format!("Argon2 hash: {e}")))?;
    Ok(out)
}

fn context_key(master: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    let mut out = [0u8; 32];
    Hkdf::<Sha256>::new(None, master)
        .expand(context.as_bytes(), &mut out)
        .map_err(|e| IdentityError::DerivationFailed(format!("HKDF expand: {e}")))?;
    Ok(out)
}

fn sealing_key(passphrase: &[u8], salt: &[u8; SALT_LEN], context: &str) -> Result<[u8; 32]> {
    let mut master = passphrase_key(passphrase, salt)?;
    let key = context_key(&master, context);
    master.zeroize();
    key
}

/// Encrypt `plaintext` under a passphrase for the given context.
pub fn seal(passphrase: &[u8], context: &str, plaintext: &[u8]) -> Result<Sealed> {
    let salt = random_bytes::<SALT_LEN>();
    let nonce = random_bytes::<NONCE_LEN>();

    let mut key = sealing_key(passphrase, &salt, context)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| IdentityError::EncryptionFailed(format!("cipher init: {e}")));
    key.zeroize();

    let ciphertext = cipher?
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| IdentityError::EncryptionFailed(format!("encrypt: {e}")))?;

    Ok(Sealed {
        salt,
        nonce,
        ciphertext,
    })
}

/// Decrypt a sealed secret. A wrong passphrase surfaces as `InvalidPassphrase`.
pub fn open(passphrase: &[u8], context: &str, sealed: &Sealed) -> Result<Vec<u8>> {
    let mut key = sealing_key(passphrase, &sealed.salt, context)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| IdentityError::DecryptionFailed(format!("cipher init: {e}")));
    key.zeroize();

    cipher?
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map_err(|_| IdentityError::InvalidPassphrase)
}
