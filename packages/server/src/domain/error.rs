//! Domain-level error types.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// A required identifier was empty
    #[error("'{0}' must not be empty")]
    Empty(&'static str),
}

/// Durable store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response
    #[error("store request failed: {0}")]
    Transport(String),

    /// The store answered with an error status
    #[error("store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The response body could not be decoded
    #[error("unexpected store response: {0}")]
    Decode(String),
}

/// Identity validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No credential or user id was supplied
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// The identity service refused the credential
    #[error("credential rejected: {0}")]
    Rejected(String),

    /// The validated identity does not match the claimed one
    #[error("claimed user '{claimed}' does not match authenticated user '{actual}'")]
    Mismatch { claimed: String, actual: String },

    /// The identity service could not be reached
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}
