//! ExecutionAuthorizer: bookkeeping for delegated invocations.
//!
//! Each request moves through `Requested → Approved → Executed` or
//! `Requested → Rejected`. The authorizer only records requests and their
//! status; the identity performs the actual invocation through an
//! [`Invoker`] once a request is approved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};
use crate::hexbytes::hex_vec;
use crate::ledger::{CallContext, CallOutput, Event};

use super::key_store::{KeyAuthority, Purpose};
use super::Address;

/// Sequential identifier of an execution request, unique per identity.
pub type ExecutionId = u64;

/// Something that can carry a delegated invocation to its target.
///
/// `ctx` is the frame in which the identity calls the target; `payload` is
/// an encoded call, or empty for a plain value transfer.
pub trait Invoker {
    fn invoke(&mut self, ctx: &mut CallContext<'_>, value: u128, payload: &[u8]) -> Result<CallOutput>;
}

/// Lifecycle of an execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Requested,
    Approved,
    Executed,
    Rejected,
}

impl ExecutionStatus {
    pub fn is_final(self) -> bool {
        matches!(self, Self::Executed | Self::Rejected)
    }
}

/// A delegated invocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub target: Address,
    pub value: u128,
    #[serde(with = "hex_vec")]
    pub data: Vec<u8>,
    pub requested_by: Address,
    pub status: ExecutionStatus,
}

/// Purpose a caller needs to request an execution against `target` from
/// identity `this`.
pub fn required_purpose(this: &Address, target: &Address) -> Purpose {
    if target == this {
        Purpose::Management
    } else {
        Purpose::Action
    }
}

/// Execution requests of one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionAuthorizer {
    next_id: ExecutionId,
    executions: BTreeMap<ExecutionId, Execution>,
}

impl ExecutionAuthorizer {
    pub fn get(&self, id: ExecutionId) -> Option<&Execution> {
        self.executions.get(&id)
    }

    pub fn executions(&self) -> impl Iterator<Item = &Execution> {
        self.executions.values()
    }

    pub fn len(&self) -> usize {
        self.executions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    /// Record a request from the caller of `ctx`.
    ///
    /// The caller is authorized up front, so the request is approved in the
    /// same step; the returned request is ready to be performed.
    pub fn request(
        &mut self,
        ctx: &mut CallContext<'_>,
        keys: &dyn KeyAuthority,
        target: Address,
        value: u128,
        data: Vec<u8>,
    ) -> Result<ExecutionId> {
        keys.authorize(ctx, required_purpose(ctx.this(), &target))?;

        let id = self.next_id;
        self.next_id += 1;
        self.executions.insert(
            id,
            Execution {
                id,
                target,
                value,
                data,
                requested_by: *ctx.caller(),
                status: ExecutionStatus::Approved,
            },
        );
        ctx.emit(Event::ExecutionRequested {
            execution_id: id,
            target,
            value,
        });
        ctx.emit(Event::Approved { execution_id: id });
        Ok(id)
    }

    /// Decide on a request that is still awaiting approval.
    ///
    /// Returns true when the request became `Approved` and should now be
    /// performed. Any status other than `Requested`, including an `Approved`
    /// request not yet performed, fails `ExecutionFinalized`.
    pub fn approve(
        &mut self,
        ctx: &mut CallContext<'_>,
        keys: &dyn KeyAuthority,
        id: ExecutionId,
        approve: bool,
    ) -> Result<bool> {
        let execution = self
            .executions
            .get(&id)
            .ok_or_else(|| IdentityError::NotFound(format!("execution {id}")))?;
        keys.authorize(ctx, required_purpose(ctx.this(), &execution.target))?;

        match execution.status {
            ExecutionStatus::Requested => {}
            ExecutionStatus::Approved | ExecutionStatus::Executed | ExecutionStatus::Rejected => {
                return Err(IdentityError::ExecutionFinalized(id));
            }
        }

        let status = if approve {
            ExecutionStatus::Approved
        } else {
            ExecutionStatus::Rejected
        };
        self.set_status(id, status);
        if approve {
            ctx.emit(Event::Approved { execution_id: id });
        } else {
            ctx.emit(Event::Rejected { execution_id: id });
        }
        Ok(approve)
    }

    /// Mark an approved request as performed.
    pub fn complete(&mut self, ctx: &mut CallContext<'_>, id: ExecutionId) -> Result<()> {
        let execution = self
            .executions
            .get_mut(&id)
            .ok_or_else(|| IdentityError::NotFound(format!("execution {id}")))?;
        if execution.status != ExecutionStatus::Approved {
            return Err(IdentityError::ExecutionFinalized(id));
        }
        execution.status = ExecutionStatus::Executed;
        let (target, value) = (execution.target, execution.value);
        ctx.emit(Event::Executed {
            execution_id: id,
            target,
            value,
        });
        Ok(())
    }

    fn set_status(&mut self, id: ExecutionId, status: ExecutionStatus) {
        if let Some(execution) = self.executions.get_mut(&id) {
            execution.status = status;
        }
    }
}
