//! ClaimTypeRegistry: the claim topics that count toward verification.

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};
use crate::identity::Address;
use crate::ledger::{CallContext, Event};

use super::require_owner;

/// Recognized claim topics, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTypeRegistry {
    owner: Address,
    topics: Vec<u64>,
}

impl ClaimTypeRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            topics: Vec::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn has_claim_type(&self, topic: u64) -> bool {
        self.topics.contains(&topic)
    }

    pub fn list_claim_types(&self) -> &[u64] {
        &self.topics
    }

    /// Recognize `topic`. Adding a known topic is a no-op.
    pub fn add_claim_type(&mut self, ctx: &mut CallContext<'_>, topic: u64) -> Result<()> {
        require_owner(&self.owner, ctx)?;
        if self.has_claim_type(topic) {
            return Ok(());
        }
        self.topics.push(topic);
        log::debug!("{}: claim type {topic} added", ctx.this());
        ctx.emit(Event::ClaimTypeAdded { topic });
        Ok(())
    }

    pub fn remove_claim_type(&mut self, ctx: &mut CallContext<'_>, topic: u64) -> Result<()> {
        require_owner(&self.owner, ctx)?;
        let index = self
            .topics
            .iter()
            .position(|t| *t == topic)
            .ok_or_else(|| IdentityError::NotFound(format!("claim type {topic}")))?;
        self.topics.remove(index);
        log::debug!("{}: claim type {topic} removed", ctx.this());
        ctx.emit(Event::ClaimTypeRemoved { topic });
        Ok(())
    }
}
