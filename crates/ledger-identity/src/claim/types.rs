//! Claim data types.

use serde::{Deserialize, Serialize};

use crate::crypto::hash;
use crate::hexbytes::{hex_newtype, hex_vec};
use crate::identity::Address;

hex_newtype!(
    /// Identifier of a claim: `keccak256(issuer ‖ topic)`.
    ///
    /// One issuer holds at most one claim per topic on a subject, so
    /// re-issuing a claim replaces the previous one.
    ClaimId,
    32,
    "claim id"
);

impl ClaimId {
    pub fn derive(issuer: &Address, topic: u64) -> Self {
        hash::claim_id(issuer, topic)
    }
}

/// Well-known claim schemes.
pub mod scheme {
    /// ECDSA signature over `keccak256(subject ‖ topic ‖ data)`.
    pub const ECDSA: u64 = 1;
    /// RSA signature (stored only, never verified here).
    pub const RSA: u64 = 2;
    /// Contract-call verification by the issuer.
    pub const CONTRACT_CALL: u64 = 3;
}

/// A claim stored on a subject identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub topic: u64,
    pub scheme: u64,
    pub issuer: Address,
    #[serde(with = "hex_vec")]
    pub signature: Vec<u8>,
    #[serde(with = "hex_vec")]
    pub data: Vec<u8>,
    pub uri: String,
    /// When the claim was (last) stored, microseconds since Unix epoch.
    pub added_at: u64,
}

impl Claim {
    pub fn is_self_attested(&self, subject: &Address) -> bool {
        &self.issuer == subject
    }
}

/// Arguments of `addClaim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub topic: u64,
    pub scheme: u64,
    pub issuer: Address,
    #[serde(with = "hex_vec")]
    pub signature: Vec<u8>,
    #[serde(with = "hex_vec")]
    pub data: Vec<u8>,
    pub uri: String,
}

impl ClaimRequest {
    /// Id the claim will be stored under.
    pub fn claim_id(&self) -> ClaimId {
        ClaimId::derive(&self.issuer, self.topic)
    }

    /// Materialize the request as a stored claim.
    pub fn into_claim(self, added_at: u64) -> Claim {
        Claim {
            id: self.claim_id(),
            topic: self.topic,
            scheme: self.scheme,
            issuer: self.issuer,
            signature: self.signature,
            data: self.data,
            uri: self.uri,
            added_at,
        }
    }
}
