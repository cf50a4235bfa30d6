//! Error types for the bookstore client.
//!
//! # Design
//! Assertion failures are ordinary values here. The runner stops at the first
//! `ClientError` and hands it up; deciding to abort the process is left to the
//! binary.

use thiserror::Error;

/// A request could not be carried out by the `Transport`.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Errors returned by the scenario runner.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A verified response differed from what the scenario expected.
    #[error("Equality assertion failed ({what}): {actual}, {expected}")]
    Mismatch {
        what: String,
        actual: String,
        expected: String,
    },

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A returned resource lacks the fields later steps need to address it.
    #[error("malformed {kind} in response: {body}")]
    MalformedResource { kind: &'static str, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_prints_both_values() {
        let err = ClientError::Mismatch {
            what: "status".to_string(),
            actual: "500".to_string(),
            expected: "200".to_string(),
        };
        assert_eq!(err.to_string(), "Equality assertion failed (status): 500, 200");
    }

    #[test]
    fn transport_error_is_transparent() {
        let err = ClientError::from(TransportError("connection refused".to_string()));
        assert_eq!(err.to_string(), "transport failure: connection refused");
    }
}
