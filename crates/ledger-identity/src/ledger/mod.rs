//! In-process ledger host.
//!
//! The `Ledger` supplies what identity contracts expect from their runtime:
//! an authenticated caller for every call, atomic all-or-nothing
//! transactions, a total order of state changes, value balances and an
//! event log.

pub mod call;
pub mod context;
pub mod event;
pub mod state;

pub use call::{Call, CallOutput};
pub use context::{CallContext, MAX_CALL_DEPTH};
pub use event::{Event, EventRecord, PendingEvent};
pub use state::{Contract, ContractKind, WorldState};

use crate::error::{IdentityError, Result};
use crate::identity::{Address, Identity};
use crate::registry::{ClaimTypeRegistry, IdentityDirectory, TrustedIssuerRegistry, Verification};

/// The ledger: committed world state plus its event log.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: WorldState,
    events: Vec<EventRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassemble a ledger from persisted parts.
    pub fn from_parts(state: WorldState, events: Vec<EventRecord>) -> Self {
        Self { state, events }
    }

    pub fn into_parts(self) -> (WorldState, Vec<EventRecord>) {
        (self.state, self.events)
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Run `f` against a scratch copy of the state. On `Ok` the copy and
    /// its events are committed; on `Err` both are dropped.
    fn run<T>(
        &mut self,
        caller: Address,
        target: Address,
        label: &str,
        f: impl FnOnce(&mut WorldState, &mut CallContext<'_>) -> Result<T>,
    ) -> Result<T> {
        let timestamp = crate::time::now_micros();
        let mut scratch = self.state.clone();
        let mut pending = Vec::new();

        let result = {
            let mut ctx = CallContext::new(caller, target, timestamp, &mut pending);
            f(&mut scratch, &mut ctx)
        };

        match result {
            Ok(value) => {
                self.state = scratch;
                let first = self.events.len() as u64;
                for (offset, PendingEvent { contract, event }) in pending.into_iter().enumerate() {
                    self.events.push(EventRecord {
                        sequence: first + offset as u64,
                        timestamp,
                        contract,
                        event,
                    });
                }
                log::debug!(
                    "tx {label} from {caller} to {target} committed ({} events)",
                    self.events.len() as u64 - first
                );
                Ok(value)
            }
            Err(e) => {
                log::warn!("tx {label} from {caller} to {target} aborted: {e}");
                Err(e)
            }
        }
    }

    // ── Deployment ───────────────────────────────────────────────────────

    fn deploy(&mut self, deployer: Address, contract: Contract) -> Result<Address> {
        let kind = contract.kind();
        let address = self.state.deploy(&deployer, contract);
        self.run(deployer, address, "deploy", |_, ctx| {
            ctx.emit(Event::ContractDeployed { kind, deployer });
            Ok(())
        })?;
        log::debug!("{kind} deployed at {address} by {deployer}");
        Ok(address)
    }

    /// Deploy an identity whose first MANAGEMENT key belongs to `deployer`.
    pub fn deploy_identity(&mut self, deployer: Address) -> Result<Address> {
        let identity = Identity::new(deployer, crate::time::now_micros());
        self.deploy(deployer, Contract::Identity(identity))
    }

    pub fn deploy_claim_type_registry(&mut self, owner: Address) -> Result<Address> {
        self.deploy(owner, Contract::ClaimTypeRegistry(ClaimTypeRegistry::new(owner)))
    }

    pub fn deploy_trusted_issuer_registry(&mut self, owner: Address) -> Result<Address> {
        self.deploy(
            owner,
            Contract::TrustedIssuerRegistry(TrustedIssuerRegistry::new(owner)),
        )
    }

    /// Deploy a directory bound to two existing registries.
    pub fn deploy_identity_directory(
        &mut self,
        owner: Address,
        trusted_issuers: Address,
        claim_types: Address,
    ) -> Result<Address> {
        if self.state.trusted_issuers(&trusted_issuers).is_none() {
            return Err(IdentityError::NotFound(format!(
                "trusted issuer registry {trusted_issuers}"
            )));
        }
        if self.state.claim_types(&claim_types).is_none() {
            return Err(IdentityError::NotFound(format!("claim type registry {claim_types}")));
        }
        self.deploy(
            owner,
            Contract::IdentityDirectory(IdentityDirectory::new(owner, trusted_issuers, claim_types)),
        )
    }

    // ── Transactions ─────────────────────────────────────────────────────

    /// Credit `amount` to `address` outside any transaction.
    pub fn fund(&mut self, address: &Address, amount: u128) -> Result<()> {
        self.state.credit(address, amount)
    }

    /// Call `target` as `caller`.
    pub fn transact(&mut self, caller: Address, target: Address, call: Call) -> Result<CallOutput> {
        self.transact_with_value(caller, target, 0, call)
    }

    /// Call `target` as `caller`, sending `value` along.
    pub fn transact_with_value(
        &mut self,
        caller: Address,
        target: Address,
        value: u128,
        call: Call,
    ) -> Result<CallOutput> {
        self.run(caller, target, call.name(), |state, ctx| {
            state.call(ctx, value, Some(&call))
        })
    }

    /// Send plain value from `from` to `to`.
    pub fn transfer(&mut self, from: Address, to: Address, value: u128) -> Result<()> {
        self.run(from, to, "transfer", |state, ctx| {
            state.call(ctx, value, None).map(|_| ())
        })
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn identity(&self, address: &Address) -> Option<&Identity> {
        self.state.identity(address)
    }

    pub fn claim_types(&self, address: &Address) -> Option<&ClaimTypeRegistry> {
        self.state.claim_types(address)
    }

    pub fn trusted_issuers(&self, address: &Address) -> Option<&TrustedIssuerRegistry> {
        self.state.trusted_issuers(address)
    }

    pub fn directory(&self, address: &Address) -> Option<&IdentityDirectory> {
        self.state.directory(address)
    }

    pub fn balance(&self, address: &Address) -> u128 {
        self.state.balance(address)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Events with `sequence >= since`.
    pub fn events_since(&self, since: u64) -> &[EventRecord] {
        let start = usize::try_from(since).unwrap_or(usize::MAX).min(self.events.len());
        &self.events[start..]
    }

    /// Evaluate `directory`'s verification predicate for `subject` now.
    pub fn is_verified(&self, directory: &Address, subject: &Address) -> Result<Verification> {
        let dir = self
            .state
            .directory(directory)
            .ok_or_else(|| IdentityError::NotFound(format!("identity directory {directory}")))?;
        let inputs = self.state.trust_inputs(dir, subject)?;
        Ok(dir.is_verified(subject, inputs))
    }
}
