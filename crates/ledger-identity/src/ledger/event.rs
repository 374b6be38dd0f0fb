//! Notifications emitted by contracts.
//!
//! Events are buffered per transaction and appended to the ledger's log
//! only when the transaction commits.

use serde::{Deserialize, Serialize};

use crate::claim::ClaimId;
use crate::identity::{Address, ExecutionId, KeyId, KeyType, Purpose};

use super::state::ContractKind;

/// A contract notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ContractDeployed {
        kind: ContractKind,
        deployer: Address,
    },
    ValueTransferred {
        from: Address,
        to: Address,
        value: u128,
    },
    KeyAdded {
        key: KeyId,
        purpose: Purpose,
        key_type: KeyType,
    },
    KeyRemoved {
        key: KeyId,
        purpose: Purpose,
        key_type: KeyType,
    },
    ExecutionRequested {
        execution_id: ExecutionId,
        target: Address,
        value: u128,
    },
    Approved {
        execution_id: ExecutionId,
    },
    Rejected {
        execution_id: ExecutionId,
    },
    Executed {
        execution_id: ExecutionId,
        target: Address,
        value: u128,
    },
    ClaimAdded {
        claim_id: ClaimId,
        topic: u64,
        scheme: u64,
        issuer: Address,
        uri: String,
    },
    ClaimChanged {
        claim_id: ClaimId,
        topic: u64,
        scheme: u64,
        issuer: Address,
        uri: String,
    },
    ClaimRemoved {
        claim_id: ClaimId,
        topic: u64,
        issuer: Address,
    },
    ClaimTypeAdded {
        topic: u64,
    },
    ClaimTypeRemoved {
        topic: u64,
    },
    TrustedIssuerAdded {
        issuer: Address,
        topics: Vec<u64>,
    },
    TrustedIssuerRemoved {
        issuer: Address,
    },
    TrustedIssuerUpdated {
        issuer: Address,
        topics: Vec<u64>,
    },
    IdentityRegistered {
        id: u64,
        identity: Address,
    },
    IdentityUpdated {
        id: u64,
        old_identity: Address,
        new_identity: Address,
    },
    IdentityRemoved {
        id: u64,
        identity: Address,
    },
}

impl Event {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContractDeployed { .. } => "ContractDeployed",
            Self::ValueTransferred { .. } => "ValueTransferred",
            Self::KeyAdded { .. } => "KeyAdded",
            Self::KeyRemoved { .. } => "KeyRemoved",
            Self::ExecutionRequested { .. } => "ExecutionRequested",
            Self::Approved { .. } => "Approved",
            Self::Rejected { .. } => "Rejected",
            Self::Executed { .. } => "Executed",
            Self::ClaimAdded { .. } => "ClaimAdded",
            Self::ClaimChanged { .. } => "ClaimChanged",
            Self::ClaimRemoved { .. } => "ClaimRemoved",
            Self::ClaimTypeAdded { .. } => "ClaimTypeAdded",
            Self::ClaimTypeRemoved { .. } => "ClaimTypeRemoved",
            Self::TrustedIssuerAdded { .. } => "TrustedIssuerAdded",
            Self::TrustedIssuerRemoved { .. } => "TrustedIssuerRemoved",
            Self::TrustedIssuerUpdated { .. } => "TrustedIssuerUpdated",
            Self::IdentityRegistered { .. } => "IdentityRegistered",
            Self::IdentityUpdated { .. } => "IdentityUpdated",
            Self::IdentityRemoved { .. } => "IdentityRemoved",
        }
    }
}

/// An event buffered inside a running transaction.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    /// Contract that emitted the event.
    pub contract: Address,
    pub event: Event,
}

/// A committed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the ledger's event log, starting at 0.
    pub sequence: u64,
    /// Timestamp of the transaction that emitted it.
    pub timestamp: u64,
    /// Contract that emitted it.
    pub contract: Address,
    pub event: Event,
}
