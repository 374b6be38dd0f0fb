//! Claims: signed assertions about an identity.
//!
//! - `types`: `ClaimId`, `Claim`, `ClaimRequest`
//! - `store`: the per-identity `ClaimStore` and the `ClaimHolder` view
//! - `verify`: signature checks against an issuer's keys

pub mod store;
pub mod types;
pub mod verify;

pub use store::{ClaimHolder, ClaimStore};
pub use types::{scheme, Claim, ClaimId, ClaimRequest};
pub use verify::{is_claim_signature_valid, verify_claim_signature};
