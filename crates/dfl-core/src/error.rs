//! Unified error type for the verification crates.
//!
//! Registry and configuration errors are fatal ([`DflError::is_fatal`]) and
//! abort the invocation. A [`DflError::Parse`] from one artifact fails the
//! check that read it and is folded into that check's outcome.
//!
//! # Example
//!
//! ```ignore
//! use dfl_core::{DflError, DflResult};
//!
//! fn require_id(raw: Option<&str>) -> DflResult<String> {
//!     raw.map(str::to_string)
//!         .ok_or_else(|| DflError::MalformedRegistry("missing field `id`".into()))
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DflError {
    /// An artifact or input could not be parsed in its expected format
    #[error("Parse error: {0}")]
    Parse(String),

    /// The contingency registry is not the expected shape
    #[error("Malformed registry: {0}")]
    MalformedRegistry(String),

    /// Unknown build mode, unknown chosen output, unreadable settings
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type DflResult<T> = Result<T, DflError>;

impl DflError {
    /// Whether the error must abort the whole invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DflError::Config(_) | DflError::MalformedRegistry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DflError::MalformedRegistry("missing field `id`".into());
        assert!(err.to_string().contains("Malformed registry"));
        assert!(err.to_string().contains("missing field `id`"));
    }

    #[test]
    fn test_config_errors_are_fatal() {
        assert!(DflError::Config("unknown build type 'Weird'".into()).is_fatal());
        assert!(DflError::MalformedRegistry("duplicate id".into()).is_fatal());
        assert!(!DflError::Parse("bad xml".into()).is_fatal());
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> DflResult<()> {
            Err(DflError::Config("test".into()))
        }

        fn outer() -> DflResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
