//! ledger-identity: self-sovereign identities on a ledger.
//!
//! Each participant owns an identity contract that manages its keys,
//! authorizes delegated invocations and accumulates claims signed by
//! third-party attestors. Registries of trusted claim topics and trusted
//! issuers let an identity directory decide whether an identity is
//! verified, without any central authority vouching for it directly.
//!
//! The [`ledger::Ledger`] host runs every operation as an atomic
//! transaction with an authenticated caller.

pub mod claim;
pub mod crypto;
pub mod error;
pub mod hexbytes;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod storage;
pub mod time;

// Re-export primary types
pub use claim::{Claim, ClaimHolder, ClaimId, ClaimRequest, ClaimStore};
pub use crypto::Secp256k1KeyPair;
pub use error::{IdentityError, Result};
pub use identity::{
    Address, ExecutionId, ExecutionStatus, Identity, KeyAuthority, KeyId, KeyStore, KeyType,
    Purpose,
};
pub use ledger::{Call, CallOutput, Event, EventRecord, Ledger};
pub use registry::{
    ClaimTypeRegistry, IdentityDirectory, Rejection, TrustedIssuerRegistry, Verification,
};
