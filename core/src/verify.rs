//! Equality assertions that can be switched off.
//!
//! With verification disabled every check passes, so the scenario still
//! issues all of its calls without judging the answers.

use std::fmt::Display;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verifier {
    enabled: bool,
}

impl Verifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Exact equality; `what` names the checked value in the error. Values
    /// are rendered with `Display`, so JSON shows up as compact JSON.
    pub fn assert_equal<A, E>(&self, what: &str, actual: A, expected: E) -> Result<(), ClientError>
    where
        A: PartialEq<E> + Display,
        E: Display,
    {
        if !self.enabled || actual == expected {
            return Ok(());
        }
        Err(ClientError::Mismatch {
            what: what.to_string(),
            actual: actual.to_string(),
            expected: expected.to_string(),
        })
    }
}
