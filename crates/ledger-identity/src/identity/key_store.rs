//! KeyStore: the keys authorized on one identity and their purposes.
//!
//! Keys are identified by `keccak256(address)` of the account that holds the
//! private half. A key carries a set of purposes; MANAGEMENT keys administer
//! the store itself and may act wherever a lower purpose is required.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::hash;
use crate::error::{IdentityError, Result};
use crate::hexbytes::hex_newtype;
use crate::ledger::{CallContext, Event};

use super::Address;

hex_newtype!(
    /// Identifier of a key: `keccak256(address)` of the key holder.
    KeyId,
    32,
    "key id"
);

/// What a key is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Administer keys and claims.
    Management,
    /// Initiate delegated invocations.
    Action,
    /// Sign or accept claims.
    Claim,
    /// Encrypt data addressed to the identity.
    Encryption,
}

impl Purpose {
    pub const ALL: [Purpose; 4] = [
        Purpose::Management,
        Purpose::Action,
        Purpose::Claim,
        Purpose::Encryption,
    ];

    /// Numeric purpose code (1..=4).
    pub fn code(self) -> u8 {
        match self {
            Self::Management => 1,
            Self::Action => 2,
            Self::Claim => 3,
            Self::Encryption => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Management => "management",
            Self::Action => "action",
            Self::Claim => "claim",
            Self::Encryption => "encryption",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = IdentityError;

    /// Accepts a purpose name or its numeric code.
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Ok(code) = lowered.parse::<u8>() {
            return Self::from_code(code)
                .ok_or_else(|| IdentityError::InvalidKey(format!("unknown key purpose: {s}")));
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| IdentityError::InvalidKey(format!("unknown key purpose: {s}")))
    }
}

/// Signature scheme of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Ecdsa,
    Rsa,
}

impl KeyType {
    pub fn code(self) -> u8 {
        match self {
            Self::Ecdsa => 1,
            Self::Rsa => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ecdsa => "ecdsa",
            Self::Rsa => "rsa",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecdsa" | "1" => Ok(Self::Ecdsa),
            "rsa" | "2" => Ok(Self::Rsa),
            other => Err(IdentityError::InvalidKey(format!("unknown key type: {other}"))),
        }
    }
}

/// A key held by an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: KeyId,
    pub purposes: BTreeSet<Purpose>,
    pub key_type: KeyType,
}

impl Key {
    pub fn has_purpose(&self, purpose: Purpose) -> bool {
        self.purposes.contains(&purpose)
    }
}

/// Read-only view of an identity's key authority.
///
/// The claim verifier checks signers against an issuer through this trait,
/// and every gated operation checks its caller through it.
pub trait KeyAuthority {
    /// Exact purpose lookup.
    fn key_has_purpose(&self, key: &KeyId, purpose: Purpose) -> bool;

    /// True if the key may act where `purpose` is required: it holds that
    /// purpose, or it holds MANAGEMENT.
    fn key_can_act_for(&self, key: &KeyId, purpose: Purpose) -> bool {
        self.key_has_purpose(key, purpose) || self.key_has_purpose(key, Purpose::Management)
    }

    /// Check that the caller of `ctx` may act for `purpose` on this identity.
    ///
    /// Calls the identity makes to itself are always authorized.
    fn authorize(&self, ctx: &CallContext<'_>, purpose: Purpose) -> Result<()> {
        if ctx.is_self_call() {
            return Ok(());
        }
        let key = hash::key_id(ctx.caller());
        if self.key_can_act_for(&key, purpose) {
            Ok(())
        } else {
            Err(IdentityError::Unauthorized(format!(
                "{} holds no {purpose} key on {}",
                ctx.caller(),
                ctx.this()
            )))
        }
    }
}

/// The set of keys authorized on one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStore {
    keys: BTreeMap<KeyId, Key>,
}

impl KeyStore {
    /// A store whose only key is a MANAGEMENT key for `owner`.
    pub fn with_management_key(owner: &Address) -> Self {
        let id = hash::key_id(owner);
        let mut keys = BTreeMap::new();
        keys.insert(
            id,
            Key {
                id,
                purposes: BTreeSet::from([Purpose::Management]),
                key_type: KeyType::Ecdsa,
            },
        );
        Self { keys }
    }

    pub fn get_key(&self, key: &KeyId) -> Option<&Key> {
        self.keys.get(key)
    }

    /// Purposes of a key; empty for unknown keys.
    pub fn get_key_purposes(&self, key: &KeyId) -> Vec<Purpose> {
        self.keys
            .get(key)
            .map(|k| k.purposes.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn get_keys_by_purpose(&self, purpose: Purpose) -> Vec<KeyId> {
        self.keys
            .values()
            .filter(|k| k.has_purpose(purpose))
            .map(|k| k.id)
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Grant `purpose` to `key`, creating the key if needed.
    pub fn add_key(
        &mut self,
        ctx: &mut CallContext<'_>,
        key: KeyId,
        purpose: Purpose,
        key_type: KeyType,
    ) -> Result<()> {
        self.authorize(ctx, Purpose::Management)?;

        let entry = self.keys.entry(key).or_insert_with(|| Key {
            id: key,
            purposes: BTreeSet::new(),
            key_type,
        });
        if !entry.purposes.insert(purpose) {
            return Err(IdentityError::DuplicateKey(format!("{key} already has {purpose}")));
        }
        let key_type = entry.key_type;

        log::debug!("{}: key {key} gained {purpose}", ctx.this());
        ctx.emit(Event::KeyAdded {
            key,
            purpose,
            key_type,
        });
        Ok(())
    }

    /// Revoke `purpose` from `key`. A key left with no purpose is dropped.
    pub fn remove_key(&mut self, ctx: &mut CallContext<'_>, key: KeyId, purpose: Purpose) -> Result<()> {
        self.authorize(ctx, Purpose::Management)?;

        let entry = self
            .keys
            .get(&key)
            .filter(|k| k.has_purpose(purpose))
            .ok_or_else(|| IdentityError::NotFound(format!("key {key} with purpose {purpose}")))?;
        let key_type = entry.key_type;

        if purpose == Purpose::Management && self.get_keys_by_purpose(Purpose::Management).len() == 1 {
            return Err(IdentityError::InvariantViolation(format!(
                "removing {key} would leave {} without a management key",
                ctx.this()
            )));
        }

        if let Some(entry) = self.keys.get_mut(&key) {
            entry.purposes.remove(&purpose);
            if entry.purposes.is_empty() {
                self.keys.remove(&key);
            }
        }

        log::debug!("{}: key {key} lost {purpose}", ctx.this());
        ctx.emit(Event::KeyRemoved {
            key,
            purpose,
            key_type,
        });
        Ok(())
    }
}

impl KeyAuthority for KeyStore {
    fn key_has_purpose(&self, key: &KeyId, purpose: Purpose) -> bool {
        self.keys.get(key).is_some_and(|k| k.has_purpose(purpose))
    }
}
