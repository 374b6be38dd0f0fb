//! Call frames.
//!
//! A `CallContext` is what every contract operation receives in place of
//! ambient runtime state: the authenticated caller, the contract being
//! called, the transaction timestamp, and the buffer collecting events
//! that will be committed only if the whole transaction succeeds.

use crate::error::{IdentityError, Result};
use crate::identity::Address;

use super::event::{Event, PendingEvent};

/// Maximum nesting of delegated invocations within one transaction.
pub const MAX_CALL_DEPTH: usize = 8;

/// One frame of a transaction.
pub struct CallContext<'a> {
    caller: Address,
    this: Address,
    timestamp: u64,
    depth: usize,
    events: &'a mut Vec<PendingEvent>,
}

impl<'a> CallContext<'a> {
    /// Open the outermost frame of a transaction.
    pub fn new(
        caller: Address,
        this: Address,
        timestamp: u64,
        events: &'a mut Vec<PendingEvent>,
    ) -> Self {
        Self {
            caller,
            this,
            timestamp,
            depth: 0,
            events,
        }
    }

    /// The authenticated address that made this call.
    pub fn caller(&self) -> &Address {
        &self.caller
    }

    /// The contract being called.
    pub fn this(&self) -> &Address {
        &self.this
    }

    /// Transaction timestamp (microseconds since Unix epoch).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Nesting depth; the outermost frame is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True when the contract is calling itself (its own delegated invocation).
    pub fn is_self_call(&self) -> bool {
        self.caller == self.this
    }

    /// Record an event emitted by the contract of this frame.
    pub fn emit(&mut self, event: Event) {
        self.events.push(PendingEvent {
            contract: self.this,
            event,
        });
    }

    /// Open a frame in which this contract calls `target`.
    pub fn nested(&mut self, target: Address) -> Result<CallContext<'_>> {
        let depth = self.depth + 1;
        if depth > MAX_CALL_DEPTH {
            return Err(IdentityError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        Ok(CallContext {
            caller: self.this,
            this: target,
            timestamp: self.timestamp,
            depth,
            events: &mut *self.events,
        })
    }
}
