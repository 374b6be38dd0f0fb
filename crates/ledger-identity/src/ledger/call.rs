//! Contract calls.
//!
//! Every state-changing operation is a [`Call`]. Calls travel as bincode
//! payloads inside delegated invocations, so an identity can forward any
//! operation to any contract.

use serde::{Deserialize, Serialize};

use crate::claim::{ClaimId, ClaimRequest};
use crate::error::{IdentityError, Result};
use crate::identity::{Address, ExecutionId, KeyId, KeyType, Purpose};

/// A state-changing contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    // Identity
    AddKey {
        key: KeyId,
        purpose: Purpose,
        key_type: KeyType,
    },
    RemoveKey {
        key: KeyId,
        purpose: Purpose,
    },
    Execute {
        target: Address,
        value: u128,
        data: Vec<u8>,
    },
    Approve {
        execution_id: ExecutionId,
        approve: bool,
    },
    AddClaim(ClaimRequest),
    RemoveClaim {
        claim_id: ClaimId,
    },

    // ClaimTypeRegistry
    AddClaimType {
        topic: u64,
    },
    RemoveClaimType {
        topic: u64,
    },

    // TrustedIssuerRegistry
    AddTrustedIssuer {
        issuer: Address,
        topics: Vec<u64>,
    },
    RemoveTrustedIssuer {
        issuer: Address,
    },
    UpdateIssuerClaimTopics {
        issuer: Address,
        topics: Vec<u64>,
    },

    // IdentityDirectory
    RegisterIdentity {
        id: u64,
        identity: Address,
    },
    UpdateIdentity {
        id: u64,
        identity: Address,
    },
    DeleteIdentity {
        id: u64,
    },
}

impl Call {
    /// Operation name as it appears in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddKey { .. } => "addKey",
            Self::RemoveKey { .. } => "removeKey",
            Self::Execute { .. } => "execute",
            Self::Approve { .. } => "approve",
            Self::AddClaim(_) => "addClaim",
            Self::RemoveClaim { .. } => "removeClaim",
            Self::AddClaimType { .. } => "addClaimType",
            Self::RemoveClaimType { .. } => "removeClaimType",
            Self::AddTrustedIssuer { .. } => "addTrustedIssuer",
            Self::RemoveTrustedIssuer { .. } => "removeTrustedIssuer",
            Self::UpdateIssuerClaimTopics { .. } => "updateIssuerClaimTopics",
            Self::RegisterIdentity { .. } => "registerIdentity",
            Self::UpdateIdentity { .. } => "updateIdentity",
            Self::DeleteIdentity { .. } => "deleteIdentity",
        }
    }

    /// Encode as a delegated-invocation payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| IdentityError::SerializationError(e.to_string()))
    }

    /// Decode a delegated-invocation payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        bincode::deserialize(payload)
            .map_err(|e| IdentityError::CallFailed(format!("undecodable call payload: {e}")))
    }
}

/// What a successful call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutput {
    None,
    Execution(ExecutionId),
    Claim(ClaimId),
}
