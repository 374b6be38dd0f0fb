//! Error types for ledger-identity.
//!
//! Every operation fails atomically: the ledger discards all writes of a
//! transaction that returns one of these errors.
//! Private key material is never included in error messages.

/// Identity error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid claim signature: {0}")]
    InvalidSignature(String),

    #[error("No trusted claim for identity {subject}: {reason}")]
    UntrustedClaim { subject: String, reason: String },

    #[error("Unknown claim type: {0}")]
    UnknownClaimType(u64),

    #[error("Issuer {issuer} is not trusted for topic {topic}")]
    UntrustedIssuer { issuer: String, topic: u64 },

    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Key already has purpose: {0}")]
    DuplicateKey(String),

    #[error("Issuer already trusted: {0}")]
    DuplicateIssuer(String),

    #[error("Invalid topic set: {0}")]
    InvalidTopics(String),

    /// The request is no longer awaiting approval (approved, executed or
    /// rejected).
    #[error("Execution {0} is no longer awaiting approval")]
    ExecutionFinalized(u64),

    #[error("Call failed: {0}")]
    CallFailed(String),

    #[error("Call depth exceeded (max {0})")]
    CallDepthExceeded(usize),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IdentityError {
    /// Stable short name of the error kind, used in CLI output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::UntrustedClaim { .. } => "untrusted_claim",
            Self::UnknownClaimType(_) => "unknown_claim_type",
            Self::UntrustedIssuer { .. } => "untrusted_issuer",
            Self::DuplicateRegistration(_) => "duplicate_registration",
            Self::NotFound(_) => "not_found",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::DuplicateIssuer(_) => "duplicate_issuer",
            Self::InvalidTopics(_) => "invalid_topics",
            Self::ExecutionFinalized(_) => "execution_finalized",
            Self::CallFailed(_) => "call_failed",
            Self::CallDepthExceeded(_) => "call_depth_exceeded",
            Self::InvalidKey(_) => "invalid_key",
            Self::DerivationFailed(_) => "derivation_failed",
            Self::EncryptionFailed(_) => "encryption_failed",
            Self::DecryptionFailed(_) => "decryption_failed",
            Self::InvalidPassphrase => "invalid_passphrase",
            Self::SerializationError(_) => "serialization_error",
            Self::InvalidFileFormat(_) => "invalid_file_format",
            Self::Io(_) => "io",
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, IdentityError>;
