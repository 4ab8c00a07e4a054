//! Assertion helpers for test bodies
//!
//! Bodies signal an expected test failure by returning an error that carries
//! [`AssertionFailure`]. Any other error is treated as an unexpected fault
//! by the default classifier.

use std::fmt::Debug;

use regex::Regex;
use thiserror::Error;

use crate::context::ActionResult;

/// A failed expectation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fail unconditionally
pub fn flunk(message: impl Into<String>) -> anyhow::Error {
    AssertionFailure::new(message).into()
}

/// Fail with `message` unless `condition` holds
pub fn check(condition: bool, message: impl Into<String>) -> ActionResult {
    if condition {
        Ok(())
    } else {
        Err(flunk(message))
    }
}

pub fn check_eq<T, U>(expected: T, actual: U) -> ActionResult
where
    T: Debug,
    U: Debug + PartialEq<T>,
{
    if actual == expected {
        Ok(())
    } else {
        Err(flunk(format!("expected {expected:?}, got {actual:?}")))
    }
}

/// Fail unless `text` matches the regular expression `pattern`
pub fn check_match(pattern: &str, text: &str) -> ActionResult {
    let regex = Regex::new(pattern)?;
    check(
        regex.is_match(text),
        format!("expected {text:?} to match /{pattern}/"),
    )
}
