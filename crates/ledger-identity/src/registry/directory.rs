//! IdentityDirectory: registration ids mapped to identities.
//!
//! Registration is open to anyone but gated by the verification
//! predicate, evaluated once at registration time. Later changes to the
//! subject's claims or to the registries do not remove existing entries;
//! use [`IdentityDirectory::is_verified`] for a fresh answer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::claim::ClaimHolder;
use crate::error::{IdentityError, Result};
use crate::identity::Address;
use crate::ledger::{CallContext, Event};

use super::verification::{evaluate, Verification};
use super::{require_owner, ClaimTypeRegistry, TrustedIssuerRegistry};

/// Trust dependencies of one predicate evaluation.
///
/// `claims` is `None` when the subject address holds no identity.
#[derive(Clone, Copy)]
pub struct TrustInputs<'a> {
    pub claims: Option<&'a dyn ClaimHolder>,
    pub issuers: &'a TrustedIssuerRegistry,
    pub types: &'a ClaimTypeRegistry,
}

/// The directory of registered identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDirectory {
    owner: Address,
    trusted_issuers: Address,
    claim_types: Address,
    entries: BTreeMap<u64, Address>,
    ids: BTreeMap<Address, u64>,
}

impl IdentityDirectory {
    /// A directory bound to the two registries it consults.
    pub fn new(owner: Address, trusted_issuers: Address, claim_types: Address) -> Self {
        Self {
            owner,
            trusted_issuers,
            claim_types,
            entries: BTreeMap::new(),
            ids: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Address of the trusted issuer registry this directory consults.
    pub fn trusted_issuers(&self) -> &Address {
        &self.trusted_issuers
    }

    /// Address of the claim type registry this directory consults.
    pub fn claim_types(&self) -> &Address {
        &self.claim_types
    }

    pub fn identity(&self, id: u64) -> Option<Address> {
        self.entries.get(&id).copied()
    }

    pub fn id_of(&self, identity: &Address) -> Option<u64> {
        self.ids.get(identity).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (u64, Address)> + '_ {
        self.entries.iter().map(|(id, addr)| (*id, *addr))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate the predicate for `subject` without touching the directory.
    pub fn is_verified(&self, subject: &Address, inputs: TrustInputs<'_>) -> Verification {
        match inputs.claims {
            Some(claims) => evaluate(subject, claims, inputs.issuers, inputs.types),
            None => Verification {
                subject: *subject,
                claims_checked: 0,
                qualifying: Vec::new(),
                rejections: Vec::new(),
                is_verified: false,
            },
        }
    }

    fn ensure_unregistered(&self, identity: &Address) -> Result<()> {
        match self.ids.get(identity) {
            Some(other) => Err(IdentityError::DuplicateRegistration(format!(
                "{identity} is already registered under id {other}"
            ))),
            None => Ok(()),
        }
    }

    pub fn register_identity(
        &mut self,
        ctx: &mut CallContext<'_>,
        id: u64,
        identity: Address,
        inputs: TrustInputs<'_>,
    ) -> Result<Verification> {
        if self.entries.contains_key(&id) {
            return Err(IdentityError::DuplicateRegistration(format!(
                "id {id} is already registered"
            )));
        }
        self.ensure_unregistered(&identity)?;
        let verification = self.is_verified(&identity, inputs).require()?;

        self.entries.insert(id, identity);
        self.ids.insert(identity, id);
        log::debug!("{}: registered {identity} as {id}", ctx.this());
        ctx.emit(Event::IdentityRegistered { id, identity });
        Ok(verification)
    }

    /// Point `id` at a different identity. The new identity must pass the
    /// predicate like any new registration.
    pub fn update_identity(
        &mut self,
        ctx: &mut CallContext<'_>,
        id: u64,
        identity: Address,
        inputs: TrustInputs<'_>,
    ) -> Result<Verification> {
        require_owner(&self.owner, ctx)?;
        let old_identity = self
            .identity(id)
            .ok_or_else(|| IdentityError::NotFound(format!("directory id {id}")))?;
        if old_identity != identity {
            self.ensure_unregistered(&identity)?;
        }
        let verification = self.is_verified(&identity, inputs).require()?;

        self.ids.remove(&old_identity);
        self.entries.insert(id, identity);
        self.ids.insert(identity, id);
        log::debug!("{}: id {id} moved from {old_identity} to {identity}", ctx.this());
        ctx.emit(Event::IdentityUpdated {
            id,
            old_identity,
            new_identity: identity,
        });
        Ok(verification)
    }

    pub fn delete_identity(&mut self, ctx: &mut CallContext<'_>, id: u64) -> Result<Address> {
        require_owner(&self.owner, ctx)?;
        let identity = self
            .entries
            .remove(&id)
            .ok_or_else(|| IdentityError::NotFound(format!("directory id {id}")))?;
        self.ids.remove(&identity);
        log::debug!("{}: id {id} ({identity}) deleted", ctx.this());
        ctx.emit(Event::IdentityRemoved { id, identity });
        Ok(identity)
    }
}
