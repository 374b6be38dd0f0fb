//! The verification predicate.
//!
//! A subject is verified when at least one of its claims has a topic the
//! claim type registry recognizes and an issuer the trusted issuer registry
//! trusts for that same topic. Signatures are not re-checked here: the
//! claim store only ever holds claims whose signature verified on insert.

use std::fmt;

use serde::Serialize;

use crate::claim::{ClaimHolder, ClaimId};
use crate::error::{IdentityError, Result};
use crate::identity::Address;

use super::{ClaimTypeRegistry, TrustedIssuerRegistry};

/// Why a claim did not count toward verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    UnknownClaimType {
        claim_id: ClaimId,
        topic: u64,
    },
    UntrustedIssuer {
        claim_id: ClaimId,
        issuer: Address,
        topic: u64,
    },
}

impl Rejection {
    pub fn claim_id(&self) -> &ClaimId {
        match self {
            Self::UnknownClaimType { claim_id, .. } | Self::UntrustedIssuer { claim_id, .. } => claim_id,
        }
    }

    /// The matching error kind.
    pub fn to_error(&self) -> IdentityError {
        match self {
            Self::UnknownClaimType { topic, .. } => IdentityError::UnknownClaimType(*topic),
            Self::UntrustedIssuer { issuer, topic, .. } => IdentityError::UntrustedIssuer {
                issuer: issuer.to_string(),
                topic: *topic,
            },
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "claim {}: {}", self.claim_id(), self.to_error())
    }
}

/// Outcome of evaluating the predicate for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub subject: Address,
    /// Number of claims examined.
    pub claims_checked: usize,
    /// Claims satisfying both registries.
    pub qualifying: Vec<ClaimId>,
    pub rejections: Vec<Rejection>,
    pub is_verified: bool,
}

impl Verification {
    /// Turn a failed verification into `UntrustedClaim`.
    pub fn require(self) -> Result<Self> {
        if self.is_verified {
            return Ok(self);
        }
        let reason = if self.claims_checked == 0 {
            "identity holds no claims".to_string()
        } else {
            self.rejections
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        };
        Err(IdentityError::UntrustedClaim {
            subject: self.subject.to_string(),
            reason,
        })
    }
}

/// Evaluate the predicate without side effects.
pub fn evaluate(
    subject: &Address,
    claims: &dyn ClaimHolder,
    issuers: &TrustedIssuerRegistry,
    types: &ClaimTypeRegistry,
) -> Verification {
    let mut qualifying = Vec::new();
    let mut rejections = Vec::new();
    let all = claims.claims();

    for claim in &all {
        if !types.has_claim_type(claim.topic) {
            rejections.push(Rejection::UnknownClaimType {
                claim_id: claim.id,
                topic: claim.topic,
            });
        } else if !issuers.has_claim_topic(&claim.issuer, claim.topic) {
            rejections.push(Rejection::UntrustedIssuer {
                claim_id: claim.id,
                issuer: claim.issuer,
                topic: claim.topic,
            });
        } else {
            qualifying.push(claim.id);
        }
    }

    Verification {
        subject: *subject,
        claims_checked: all.len(),
        is_verified: !qualifying.is_empty(),
        qualifying,
        rejections,
    }
}
