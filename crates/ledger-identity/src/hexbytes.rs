//! Fixed-width byte newtypes rendered as `0x`-prefixed hex.
//!
//! Addresses, key ids and claim ids all travel as hex strings in JSON
//! snapshots, CLI arguments and log lines. The macro below gives each of
//! them the same `Display`/`FromStr`/serde behavior.

use crate::error::{IdentityError, Result};

fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parse a hex string (with or without `0x`) into exactly `N` bytes.
pub fn parse_fixed<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(strip_hex_prefix(s))
        .map_err(|e| IdentityError::InvalidKey(format!("invalid {what} hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| IdentityError::InvalidKey(format!("{what} must be {N} bytes")))
}

/// Parse an arbitrary-length hex string (with or without `0x`).
pub fn parse_bytes(s: &str) -> Result<Vec<u8>> {
    hex::decode(strip_hex_prefix(s)).map_err(|e| IdentityError::SerializationError(format!("invalid hex: {e}")))
}

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn to_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

macro_rules! hex_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr, $what:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width of the value in bytes.
            pub const LEN: usize = $len;

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Parse from a hex string, with or without `0x`.
            pub fn from_hex(s: &str) -> $crate::error::Result<Self> {
                $crate::hexbytes::parse_fixed::<$len>(s, $what).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::IdentityError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use hex_newtype;

/// Serde adapter storing `Vec<u8>` fields as `0x` hex strings.
pub mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_prefixed(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_bytes(&s).map_err(serde::de::Error::custom)
    }
}
