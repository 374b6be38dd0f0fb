//! Trust registries and the identity directory.
//!
//! - `claim_types`: claim topics recognized as meaningful
//! - `trusted_issuers`: issuers trusted for specific topics
//! - `verification`: the predicate composing both with a subject's claims
//! - `directory`: id → identity mappings gated by that predicate
//!
//! Each registry has an owner; only the owner may change it.

pub mod claim_types;
pub mod directory;
pub mod trusted_issuers;
pub mod verification;

pub use claim_types::ClaimTypeRegistry;
pub use directory::IdentityDirectory;
pub use trusted_issuers::{TrustedIssuerEntry, TrustedIssuerRegistry};
pub use verification::{evaluate, Rejection, Verification};

use crate::error::{IdentityError, Result};
use crate::identity::Address;
use crate::ledger::CallContext;

/// Fail `Unauthorized` unless the caller of `ctx` is `owner`.
pub(crate) fn require_owner(owner: &Address, ctx: &CallContext<'_>) -> Result<()> {
    if ctx.caller() == owner {
        Ok(())
    } else {
        Err(IdentityError::Unauthorized(format!(
            "{} is not the owner of {}",
            ctx.caller(),
            ctx.this()
        )))
    }
}
