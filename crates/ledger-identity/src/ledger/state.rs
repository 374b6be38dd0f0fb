//! World state and call dispatch.
//!
//! `WorldState` holds every deployed contract and every balance. A call
//! runs against a copy of its target contract and writes the copy back
//! only on success, so contracts can read each other freely while one of
//! them is executing. A contract that is already executing cannot be
//! entered again from another contract.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claim::ClaimHolder;
use crate::error::{IdentityError, Result};
use crate::identity::{Address, Identity, Invoker, KeyAuthority};
use crate::registry::directory::TrustInputs;
use crate::registry::{ClaimTypeRegistry, IdentityDirectory, TrustedIssuerRegistry};

use super::call::{Call, CallOutput};
use super::context::CallContext;
use super::event::Event;

/// Kind of a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Identity,
    ClaimTypeRegistry,
    TrustedIssuerRegistry,
    IdentityDirectory,
}

impl ContractKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::ClaimTypeRegistry => "claim_type_registry",
            Self::TrustedIssuerRegistry => "trusted_issuer_registry",
            Self::IdentityDirectory => "identity_directory",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum Contract {
    Identity(Identity),
    ClaimTypeRegistry(ClaimTypeRegistry),
    TrustedIssuerRegistry(TrustedIssuerRegistry),
    IdentityDirectory(IdentityDirectory),
}

impl Contract {
    pub fn kind(&self) -> ContractKind {
        match self {
            Self::Identity(_) => ContractKind::Identity,
            Self::ClaimTypeRegistry(_) => ContractKind::ClaimTypeRegistry,
            Self::TrustedIssuerRegistry(_) => ContractKind::TrustedIssuerRegistry,
            Self::IdentityDirectory(_) => ContractKind::IdentityDirectory,
        }
    }
}

/// All contracts and balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    contracts: BTreeMap<Address, Contract>,
    balances: BTreeMap<Address, u128>,
    nonce: u64,
    /// Contracts currently executing, outermost first.
    #[serde(skip)]
    entered: Vec<Address>,
}

impl WorldState {
    // ── Reads ────────────────────────────────────────────────────────────

    pub fn contract(&self, address: &Address) -> Option<&Contract> {
        self.contracts.get(address)
    }

    pub fn contracts(&self) -> impl Iterator<Item = (&Address, &Contract)> {
        self.contracts.iter()
    }

    pub fn identity(&self, address: &Address) -> Option<&Identity> {
        match self.contracts.get(address) {
            Some(Contract::Identity(identity)) => Some(identity),
            _ => None,
        }
    }

    pub fn claim_types(&self, address: &Address) -> Option<&ClaimTypeRegistry> {
        match self.contracts.get(address) {
            Some(Contract::ClaimTypeRegistry(registry)) => Some(registry),
            _ => None,
        }
    }

    pub fn trusted_issuers(&self, address: &Address) -> Option<&TrustedIssuerRegistry> {
        match self.contracts.get(address) {
            Some(Contract::TrustedIssuerRegistry(registry)) => Some(registry),
            _ => None,
        }
    }

    pub fn directory(&self, address: &Address) -> Option<&IdentityDirectory> {
        match self.contracts.get(address) {
            Some(Contract::IdentityDirectory(directory)) => Some(directory),
            _ => None,
        }
    }

    pub fn balance(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Resolve the registries a directory consults, plus the subject's claims.
    pub fn trust_inputs<'a>(
        &'a self,
        directory: &IdentityDirectory,
        subject: &Address,
    ) -> Result<TrustInputs<'a>> {
        let issuers = self.trusted_issuers(directory.trusted_issuers()).ok_or_else(|| {
            IdentityError::NotFound(format!(
                "trusted issuer registry {}",
                directory.trusted_issuers()
            ))
        })?;
        let types = self.claim_types(directory.claim_types()).ok_or_else(|| {
            IdentityError::NotFound(format!("claim type registry {}", directory.claim_types()))
        })?;
        Ok(TrustInputs {
            claims: self.identity(subject).map(|i| i as &dyn ClaimHolder),
            issuers,
            types,
        })
    }

    // ── Writes ───────────────────────────────────────────────────────────

    /// Place a new contract at the next address derived from `deployer`.
    pub fn deploy(&mut self, deployer: &Address, contract: Contract) -> Address {
        let mut address = Address::derive_contract(deployer, self.nonce);
        while self.contracts.contains_key(&address) {
            self.nonce += 1;
            address = Address::derive_contract(deployer, self.nonce);
        }
        self.nonce += 1;
        self.contracts.insert(address, contract);
        address
    }

    /// Credit an address out of thin air.
    pub fn credit(&mut self, address: &Address, amount: u128) -> Result<()> {
        let balance = self.balances.entry(*address).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| IdentityError::CallFailed(format!("balance overflow for {address}")))?;
        Ok(())
    }

    /// Move value between addresses.
    pub fn transfer(&mut self, from: &Address, to: &Address, value: u128) -> Result<()> {
        if value == 0 || from == to {
            return Ok(());
        }
        let available = self.balance(from);
        if available < value {
            return Err(IdentityError::CallFailed(format!(
                "{from} has {available}, cannot send {value}"
            )));
        }
        self.balances.insert(*from, available - value);
        self.credit(to, value)
    }

    /// Run one frame: move `value` from caller to target, then run `call`
    /// on the target contract, if any.
    pub fn call(&mut self, ctx: &mut CallContext<'_>, value: u128, call: Option<&Call>) -> Result<CallOutput> {
        let (caller, target) = (*ctx.caller(), *ctx.this());
        if value > 0 && caller != target {
            self.transfer(&caller, &target, value)?;
            ctx.emit(Event::ValueTransferred {
                from: caller,
                to: target,
                value,
            });
        }

        let Some(call) = call else {
            return Ok(CallOutput::None);
        };
        if self.entered.contains(&target) {
            return Err(IdentityError::CallFailed(format!(
                "reentrant call into {target}"
            )));
        }
        let mut contract = self
            .contracts
            .get(&target)
            .cloned()
            .ok_or_else(|| IdentityError::CallFailed(format!("no contract at {target}")))?;

        self.entered.push(target);
        let result = self.dispatch(&mut contract, ctx, call);
        self.entered.pop();

        if result.is_ok() {
            self.contracts.insert(target, contract);
        }
        result
    }

    fn dispatch(&mut self, contract: &mut Contract, ctx: &mut CallContext<'_>, call: &Call) -> Result<CallOutput> {
        match contract {
            Contract::Identity(identity) => self.dispatch_identity(identity, ctx, call),
            Contract::ClaimTypeRegistry(registry) => match call {
                Call::AddClaimType { topic } => registry.add_claim_type(ctx, *topic),
                Call::RemoveClaimType { topic } => registry.remove_claim_type(ctx, *topic),
                other => Err(unsupported(other, ContractKind::ClaimTypeRegistry)),
            }
            .map(|()| CallOutput::None),
            Contract::TrustedIssuerRegistry(registry) => match call {
                Call::AddTrustedIssuer { issuer, topics } => {
                    registry.add_trusted_issuer(ctx, *issuer, topics)
                }
                Call::RemoveTrustedIssuer { issuer } => registry.remove_trusted_issuer(ctx, *issuer),
                Call::UpdateIssuerClaimTopics { issuer, topics } => {
                    registry.update_issuer_claim_topics(ctx, *issuer, topics)
                }
                other => Err(unsupported(other, ContractKind::TrustedIssuerRegistry)),
            }
            .map(|()| CallOutput::None),
            Contract::IdentityDirectory(directory) => {
                match call {
                    Call::RegisterIdentity { id, identity } => {
                        let inputs = self.trust_inputs(directory, identity)?;
                        directory.register_identity(ctx, *id, *identity, inputs)?;
                    }
                    Call::UpdateIdentity { id, identity } => {
                        let inputs = self.trust_inputs(directory, identity)?;
                        directory.update_identity(ctx, *id, *identity, inputs)?;
                    }
                    Call::DeleteIdentity { id } => {
                        directory.delete_identity(ctx, *id)?;
                    }
                    other => return Err(unsupported(other, ContractKind::IdentityDirectory)),
                }
                Ok(CallOutput::None)
            }
        }
    }

    fn dispatch_identity(
        &mut self,
        identity: &mut Identity,
        ctx: &mut CallContext<'_>,
        call: &Call,
    ) -> Result<CallOutput> {
        match call {
            Call::AddKey {
                key,
                purpose,
                key_type,
            } => identity.add_key(ctx, *key, *purpose, *key_type)?,
            Call::RemoveKey { key, purpose } => identity.remove_key(ctx, *key, *purpose)?,
            Call::AddClaim(request) => {
                let issuer_keys = if &request.issuer == ctx.this() {
                    None
                } else {
                    self.identity(&request.issuer).map(|i| i as &dyn KeyAuthority)
                };
                let id = identity.add_claim(ctx, request.clone(), issuer_keys)?;
                return Ok(CallOutput::Claim(id));
            }
            Call::RemoveClaim { claim_id } => {
                identity.remove_claim(ctx, *claim_id)?;
            }
            Call::Execute {
                target,
                value,
                data,
            } => {
                let id = identity.request_execution(ctx, *target, *value, data.clone())?;
                self.perform_execution(identity, ctx, id)?;
                return Ok(CallOutput::Execution(id));
            }
            Call::Approve {
                execution_id,
                approve,
            } => {
                if identity.approve(ctx, *execution_id, *approve)? {
                    self.perform_execution(identity, ctx, *execution_id)?;
                }
                return Ok(CallOutput::Execution(*execution_id));
            }
            other => return Err(unsupported(other, ContractKind::Identity)),
        }
        Ok(CallOutput::None)
    }

    /// Carry out an approved execution. A request aimed at the identity
    /// itself runs directly on it; anything else goes through the world.
    fn perform_execution(
        &mut self,
        identity: &mut Identity,
        ctx: &mut CallContext<'_>,
        id: u64,
    ) -> Result<()> {
        let this = *ctx.this();
        let target = identity
            .executions()
            .get(id)
            .map(|e| e.target)
            .ok_or_else(|| IdentityError::NotFound(format!("execution {id}")))?;
        if target != this {
            return identity.perform(ctx, id, self);
        }

        let data = identity
            .executions()
            .get(id)
            .map(|e| e.data.clone())
            .unwrap_or_default();
        if !data.is_empty() {
            let call = Call::decode(&data)?;
            let mut inner = ctx.nested(this)?;
            self.dispatch_identity(identity, &mut inner, &call)?;
        }
        identity.complete_execution(ctx, id)
    }
}

impl Invoker for WorldState {
    fn invoke(&mut self, ctx: &mut CallContext<'_>, value: u128, payload: &[u8]) -> Result<CallOutput> {
        if payload.is_empty() {
            return self.call(ctx, value, None);
        }
        let call = Call::decode(payload)?;
        self.call(ctx, value, Some(&call))
    }
}

fn unsupported(call: &Call, kind: ContractKind) -> IdentityError {
    IdentityError::CallFailed(format!("{kind} does not support {}", call.name()))
}
