use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The token stream did not describe a well-formed object where a hit was expected.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The concrete type chosen for a hit could not be populated from its document.
    #[error("Failed to materialize hit as `{type_name}`: {reason} (document: {fragment})")]
    MaterializationFailure {
        type_name: &'static str,
        reason: String,
        fragment: String,
    },

    /// An internal invariant was broken. Never a recoverable condition.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
