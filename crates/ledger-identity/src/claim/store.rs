//! ClaimStore: claims attested about one identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};
use crate::identity::{KeyAuthority, Purpose};
use crate::ledger::{CallContext, Event};

use super::types::{Claim, ClaimId, ClaimRequest};
use super::verify::verify_claim_signature;

/// Read-only view of the claims held by an identity.
pub trait ClaimHolder {
    fn get_claim(&self, id: &ClaimId) -> Option<&Claim>;

    /// Ids of the claims with `topic`, in the order they were first added.
    fn get_claim_ids_by_topic(&self, topic: u64) -> Vec<ClaimId>;

    /// All claims, ordered by topic and then insertion.
    fn claims(&self) -> Vec<&Claim>;
}

/// Claims stored on one identity, keyed by `keccak256(issuer ‖ topic)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimStore {
    claims: BTreeMap<ClaimId, Claim>,
    by_topic: BTreeMap<u64, Vec<ClaimId>>,
}

impl ClaimStore {
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Add or replace a claim on the identity `ctx.this()`.
    ///
    /// `keys` is this identity's key authority. `issuer_keys` is the
    /// issuer's key authority, or `None` when the issuer is not an
    /// identity; it is only consulted for third-party claims.
    pub fn add_claim(
        &mut self,
        ctx: &mut CallContext<'_>,
        keys: &dyn KeyAuthority,
        request: ClaimRequest,
        issuer_keys: Option<&dyn KeyAuthority>,
    ) -> Result<ClaimId> {
        let subject = *ctx.this();

        if request.issuer == subject {
            keys.authorize(ctx, Purpose::Claim)?;
        } else {
            if ctx.caller() != &request.issuer {
                keys.authorize(ctx, Purpose::Claim)?;
            }
            let issuer_keys = issuer_keys.ok_or_else(|| {
                IdentityError::InvalidSignature(format!("issuer {} is not an identity", request.issuer))
            })?;
            verify_claim_signature(
                &request.issuer,
                issuer_keys,
                &subject,
                request.topic,
                &request.data,
                &request.signature,
            )?;
        }

        let claim = request.into_claim(ctx.timestamp());
        let id = claim.id;
        let (topic, scheme, issuer, uri) = (claim.topic, claim.scheme, claim.issuer, claim.uri.clone());

        let replaced = self.claims.insert(id, claim).is_some();
        if replaced {
            log::debug!("{subject}: claim {id} replaced (topic {topic})");
            ctx.emit(Event::ClaimChanged {
                claim_id: id,
                topic,
                scheme,
                issuer,
                uri,
            });
        } else {
            self.by_topic.entry(topic).or_default().push(id);
            log::debug!("{subject}: claim {id} added (topic {topic})");
            ctx.emit(Event::ClaimAdded {
                claim_id: id,
                topic,
                scheme,
                issuer,
                uri,
            });
        }
        Ok(id)
    }

    /// Remove a claim. The caller needs CLAIM or MANAGEMENT on the subject.
    pub fn remove_claim(
        &mut self,
        ctx: &mut CallContext<'_>,
        keys: &dyn KeyAuthority,
        id: ClaimId,
    ) -> Result<Claim> {
        keys.authorize(ctx, Purpose::Claim)?;

        let claim = self
            .claims
            .remove(&id)
            .ok_or_else(|| IdentityError::NotFound(format!("claim {id}")))?;
        if let Some(ids) = self.by_topic.get_mut(&claim.topic) {
            ids.retain(|other| other != &id);
            if ids.is_empty() {
                self.by_topic.remove(&claim.topic);
            }
        }

        log::debug!("{}: claim {id} removed", ctx.this());
        ctx.emit(Event::ClaimRemoved {
            claim_id: id,
            topic: claim.topic,
            issuer: claim.issuer,
        });
        Ok(claim)
    }
}

impl ClaimHolder for ClaimStore {
    fn get_claim(&self, id: &ClaimId) -> Option<&Claim> {
        self.claims.get(id)
    }

    fn get_claim_ids_by_topic(&self, topic: u64) -> Vec<ClaimId> {
        self.by_topic.get(&topic).cloned().unwrap_or_default()
    }

    fn claims(&self) -> Vec<&Claim> {
        self.by_topic
            .values()
            .flatten()
            .filter_map(|id| self.claims.get(id))
            .collect()
    }
}
