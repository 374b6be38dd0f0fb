//! Identities: the on-ledger object a participant owns.
//!
//! An [`Identity`] composes three independently owned parts behind one
//! address: a [`KeyStore`] (who may act, and for what), an
//! [`ExecutionAuthorizer`] (delegated invocations) and a
//! [`ClaimStore`](crate::claim::ClaimStore) (attestations about it).

pub mod address;
pub mod executor;
pub mod key_store;

pub use address::Address;
pub use executor::{
    required_purpose, Execution, ExecutionAuthorizer, ExecutionId, ExecutionStatus, Invoker,
};
pub use key_store::{Key, KeyAuthority, KeyId, KeyStore, KeyType, Purpose};

use serde::{Deserialize, Serialize};

use crate::claim::{Claim, ClaimHolder, ClaimId, ClaimRequest, ClaimStore};
use crate::error::{IdentityError, Result};
use crate::ledger::CallContext;

/// A deployed identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account that deployed the identity; holds its first MANAGEMENT key.
    pub deployer: Address,
    /// Deployment time, microseconds since Unix epoch.
    pub created_at: u64,
    keys: KeyStore,
    executions: ExecutionAuthorizer,
    claims: ClaimStore,
}

impl Identity {
    pub fn new(deployer: Address, created_at: u64) -> Self {
        Self {
            deployer,
            created_at,
            keys: KeyStore::with_management_key(&deployer),
            executions: ExecutionAuthorizer::default(),
            claims: ClaimStore::default(),
        }
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    pub fn executions(&self) -> &ExecutionAuthorizer {
        &self.executions
    }

    pub fn claim_store(&self) -> &ClaimStore {
        &self.claims
    }

    // ── Keys ─────────────────────────────────────────────────────────────

    pub fn add_key(
        &mut self,
        ctx: &mut CallContext<'_>,
        key: KeyId,
        purpose: Purpose,
        key_type: KeyType,
    ) -> Result<()> {
        self.keys.add_key(ctx, key, purpose, key_type)
    }

    pub fn remove_key(&mut self, ctx: &mut CallContext<'_>, key: KeyId, purpose: Purpose) -> Result<()> {
        self.keys.remove_key(ctx, key, purpose)
    }

    // ── Claims ───────────────────────────────────────────────────────────

    pub fn add_claim(
        &mut self,
        ctx: &mut CallContext<'_>,
        request: ClaimRequest,
        issuer_keys: Option<&dyn KeyAuthority>,
    ) -> Result<ClaimId> {
        self.claims.add_claim(ctx, &self.keys, request, issuer_keys)
    }

    pub fn remove_claim(&mut self, ctx: &mut CallContext<'_>, id: ClaimId) -> Result<Claim> {
        self.claims.remove_claim(ctx, &self.keys, id)
    }

    // ── Delegated invocation ─────────────────────────────────────────────

    /// Record and approve a request; see [`ExecutionAuthorizer::request`].
    pub fn request_execution(
        &mut self,
        ctx: &mut CallContext<'_>,
        target: Address,
        value: u128,
        data: Vec<u8>,
    ) -> Result<ExecutionId> {
        self.executions.request(ctx, &self.keys, target, value, data)
    }

    /// Returns true when the request became approved and must be performed.
    pub fn approve(&mut self, ctx: &mut CallContext<'_>, id: ExecutionId, approve: bool) -> Result<bool> {
        self.executions.approve(ctx, &self.keys, id, approve)
    }

    pub fn complete_execution(&mut self, ctx: &mut CallContext<'_>, id: ExecutionId) -> Result<()> {
        self.executions.complete(ctx, id)
    }

    /// Perform an approved request against another contract or account.
    pub fn perform(
        &mut self,
        ctx: &mut CallContext<'_>,
        id: ExecutionId,
        invoker: &mut dyn Invoker,
    ) -> Result<()> {
        let execution = self
            .executions
            .get(id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(format!("execution {id}")))?;
        {
            let mut inner = ctx.nested(execution.target)?;
            invoker.invoke(&mut inner, execution.value, &execution.data)?;
        }
        self.executions.complete(ctx, id)
    }

    /// Request and perform a delegated invocation in one step.
    pub fn execute(
        &mut self,
        ctx: &mut CallContext<'_>,
        target: Address,
        value: u128,
        data: Vec<u8>,
        invoker: &mut dyn Invoker,
    ) -> Result<ExecutionId> {
        let id = self.request_execution(ctx, target, value, data)?;
        self.perform(ctx, id, invoker)?;
        Ok(id)
    }
}

impl KeyAuthority for Identity {
    fn key_has_purpose(&self, key: &KeyId, purpose: Purpose) -> bool {
        self.keys.key_has_purpose(key, purpose)
    }
}

impl ClaimHolder for Identity {
    fn get_claim(&self, id: &ClaimId) -> Option<&Claim> {
        self.claims.get_claim(id)
    }

    fn get_claim_ids_by_topic(&self, topic: u64) -> Vec<ClaimId> {
        self.claims.get_claim_ids_by_topic(topic)
    }

    fn claims(&self) -> Vec<&Claim> {
        self.claims.claims()
    }
}
