//! Build-time errors
//!
//! Errors raised while assembling a context tree. They surface immediately
//! to the caller building the tree and are never deferred to run time.

use thiserror::Error;

/// Context tree construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Invalid operation `{call}` in static context \"{context}\"")]
    InvalidOperation { call: String, context: String },
}

impl BuildError {
    pub fn invalid_operation(call: impl Into<String>, context: impl Into<String>) -> Self {
        BuildError::InvalidOperation {
            call: call.into(),
            context: context.into(),
        }
    }
}

/// Result of a builder block
pub type BuildResult = Result<(), BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_operation_message() {
        let err = BuildError::invalid_operation("should(\"foo\", before)", "stash");
        assert_eq!(
            err.to_string(),
            "Invalid operation `should(\"foo\", before)` in static context \"stash\""
        );
    }
}
