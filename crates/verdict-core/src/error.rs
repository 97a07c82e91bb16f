//! Error types for the verdict data model

use thiserror::Error;

/// Result type alias using VerdictError
pub type Result<T> = std::result::Result<T, VerdictError>;

/// Errors that can occur while assembling or querying validation inputs
///
/// These never carry a verdict. The engine turns any of them into an
/// `INDETERMINATE / UNEXPECTED_ERROR` conclusion for the token being validated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerdictError {
    /// Missing required field in a builder
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A token references another token that is not part of the snapshot
    #[error("Unknown {kind} token: {id}")]
    UnknownToken { kind: &'static str, id: String },

    /// Two tokens of the same kind share an identifier
    #[error("Duplicate {kind} token: {id}")]
    DuplicateToken { kind: &'static str, id: String },

    /// A validity interval ends before it starts
    #[error("Invalid validity range for '{id}': not_after {not_after} precedes not_before {not_before}")]
    InvalidValidityRange {
        id: String,
        not_before: String,
        not_after: String,
    },

    /// The policy is internally inconsistent
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VerdictError {
    /// Shorthand for an unknown certificate reference
    pub fn unknown_certificate(id: impl ToString) -> Self {
        VerdictError::UnknownToken {
            kind: "certificate",
            id: id.to_string(),
        }
    }

    /// Shorthand for an unknown revocation reference
    pub fn unknown_revocation(id: impl ToString) -> Self {
        VerdictError::UnknownToken {
            kind: "revocation",
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for VerdictError {
    fn from(err: serde_json::Error) -> Self {
        VerdictError::SerializationError(err.to_string())
    }
}
