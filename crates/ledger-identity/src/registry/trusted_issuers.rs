//! TrustedIssuerRegistry: which issuers are trusted, and for which topics.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};
use crate::identity::Address;
use crate::ledger::{CallContext, Event};

use super::require_owner;

/// One trusted issuer and its topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedIssuerEntry {
    pub issuer: Address,
    pub topics: BTreeSet<u64>,
}

/// Trusted issuers in the order they were added; one entry per issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedIssuerRegistry {
    owner: Address,
    issuers: Vec<TrustedIssuerEntry>,
}

fn topic_set(issuer: &Address, topics: &[u64]) -> Result<BTreeSet<u64>> {
    let set: BTreeSet<u64> = topics.iter().copied().collect();
    if set.is_empty() {
        return Err(IdentityError::InvalidTopics(format!(
            "issuer {issuer} needs at least one topic"
        )));
    }
    Ok(set)
}

impl TrustedIssuerRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            issuers: Vec::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    fn entry(&self, issuer: &Address) -> Option<&TrustedIssuerEntry> {
        self.issuers.iter().find(|e| &e.issuer == issuer)
    }

    pub fn is_trusted_issuer(&self, issuer: &Address) -> bool {
        self.entry(issuer).is_some()
    }

    /// False when the issuer is unknown.
    pub fn has_claim_topic(&self, issuer: &Address, topic: u64) -> bool {
        self.entry(issuer).is_some_and(|e| e.topics.contains(&topic))
    }

    pub fn get_trusted_issuer_claim_topics(&self, issuer: &Address) -> Option<Vec<u64>> {
        self.entry(issuer).map(|e| e.topics.iter().copied().collect())
    }

    pub fn list_trusted_issuers(&self) -> Vec<Address> {
        self.issuers.iter().map(|e| e.issuer).collect()
    }

    pub fn entries(&self) -> &[TrustedIssuerEntry] {
        &self.issuers
    }

    pub fn add_trusted_issuer(
        &mut self,
        ctx: &mut CallContext<'_>,
        issuer: Address,
        topics: &[u64],
    ) -> Result<()> {
        require_owner(&self.owner, ctx)?;
        let topics = topic_set(&issuer, topics)?;
        if self.is_trusted_issuer(&issuer) {
            return Err(IdentityError::DuplicateIssuer(issuer.to_string()));
        }

        log::debug!("{}: trusting {issuer} for {topics:?}", ctx.this());
        ctx.emit(Event::TrustedIssuerAdded {
            issuer,
            topics: topics.iter().copied().collect(),
        });
        self.issuers.push(TrustedIssuerEntry { issuer, topics });
        Ok(())
    }

    pub fn remove_trusted_issuer(&mut self, ctx: &mut CallContext<'_>, issuer: Address) -> Result<()> {
        require_owner(&self.owner, ctx)?;
        let index = self
            .issuers
            .iter()
            .position(|e| e.issuer == issuer)
            .ok_or_else(|| IdentityError::NotFound(format!("trusted issuer {issuer}")))?;
        self.issuers.remove(index);

        log::debug!("{}: no longer trusting {issuer}", ctx.this());
        ctx.emit(Event::TrustedIssuerRemoved { issuer });
        Ok(())
    }

    /// Replace the issuer's topic set.
    pub fn update_issuer_claim_topics(
        &mut self,
        ctx: &mut CallContext<'_>,
        issuer: Address,
        topics: &[u64],
    ) -> Result<()> {
        require_owner(&self.owner, ctx)?;
        let topics = topic_set(&issuer, topics)?;
        let entry = self
            .issuers
            .iter_mut()
            .find(|e| e.issuer == issuer)
            .ok_or_else(|| IdentityError::NotFound(format!("trusted issuer {issuer}")))?;
        entry.topics = topics;
        let topics: Vec<u64> = entry.topics.iter().copied().collect();

        log::debug!("{}: {issuer} now trusted for {topics:?}", ctx.this());
        ctx.emit(Event::TrustedIssuerUpdated { issuer, topics });
        Ok(())
    }
}
