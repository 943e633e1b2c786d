//! Error handling for refract
//!
//! Only [`RefractError::InvalidResolveTarget`] is ever returned to a client.
//! Every other variant is produced and consumed inside a single event's
//! processing, where it is logged and turned into "skip" or "no edit".

use std::path::PathBuf;
use thiserror::Error;

/// Standardized error codes attached to log records and client errors
pub mod error_codes {
    /// No source root matches the path
    pub const E2001_UNRESOLVED_LOCATION: &str = "E2001";
    /// Event shape the engine cannot act on (e.g. folder-to-folder move)
    pub const E2002_UNSUPPORTED_EVENT_SHAPE: &str = "E2002";
    /// Refactoring engine failed to produce an edit
    pub const E2003_ENGINE_COMPUTATION: &str = "E2003";
    /// Unknown request id or out-of-range proposal id
    pub const E2004_INVALID_RESOLVE_TARGET: &str = "E2004";
    /// Promoting or releasing a temporary working copy failed
    pub const E2005_TEMPORARY_STATE: &str = "E2005";
    /// Build path provider failure
    pub const E2006_BUILD_PATH: &str = "E2006";
    /// Configuration error
    pub const E2007_CONFIG: &str = "E2007";
    /// I/O error
    pub const E2008_IO: &str = "E2008";
}

/// Core error type used throughout refract
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RefractError {
    #[error("No source root contains {path}")]
    UnresolvedLocation { path: PathBuf },

    #[error("Unsupported event shape: {old} -> {new}")]
    UnsupportedEventShape { old: PathBuf, new: PathBuf },

    #[error("Refactoring engine failed: {message}")]
    EngineComputation { message: String },

    #[error("Invalid resolve target (request {request_id}, proposal {proposal_id}): {reason}")]
    InvalidResolveTarget {
        request_id: u64,
        proposal_id: usize,
        reason: String,
    },

    #[error("Working copy state failed for {path}: {message}")]
    TemporaryStatePromotion { path: PathBuf, message: String },

    #[error("Build path error: {message}")]
    BuildPath { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefractError {
    pub fn unresolved(path: impl Into<PathBuf>) -> Self {
        Self::UnresolvedLocation { path: path.into() }
    }

    pub fn unsupported_event(old: impl Into<PathBuf>, new: impl Into<PathBuf>) -> Self {
        Self::UnsupportedEventShape {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::EngineComputation {
            message: message.into(),
        }
    }

    pub fn invalid_target(request_id: u64, proposal_id: usize, reason: impl Into<String>) -> Self {
        Self::InvalidResolveTarget {
            request_id,
            proposal_id,
            reason: reason.into(),
        }
    }

    pub fn temporary_state(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TemporaryStatePromotion {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn build_path(message: impl Into<String>) -> Self {
        Self::BuildPath {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        use error_codes::*;

        match self {
            Self::UnresolvedLocation { .. } => E2001_UNRESOLVED_LOCATION,
            Self::UnsupportedEventShape { .. } => E2002_UNSUPPORTED_EVENT_SHAPE,
            Self::EngineComputation { .. } => E2003_ENGINE_COMPUTATION,
            Self::InvalidResolveTarget { .. } => E2004_INVALID_RESOLVE_TARGET,
            Self::TemporaryStatePromotion { .. } => E2005_TEMPORARY_STATE,
            Self::BuildPath { .. } => E2006_BUILD_PATH,
            Self::Config { .. } => E2007_CONFIG,
            Self::Io(_) => E2008_IO,
        }
    }

    /// Whether the error must be surfaced to the client rather than degraded
    pub fn is_client_visible(&self) -> bool {
        matches!(self, Self::InvalidResolveTarget { .. })
    }
}

/// Result type alias for convenience
pub type RefractResult<T> = Result<T, RefractError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        fn read() -> RefractResult<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"))?;
            Ok(())
        }

        match read().unwrap_err() {
            RefractError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("Expected IO error, got {other:?}"),
        }
    }

    #[test]
    fn test_only_invalid_target_is_client_visible() {
        assert!(RefractError::invalid_target(7, 5, "out of range").is_client_visible());
        assert!(!RefractError::engine("boom").is_client_visible());
        assert!(!RefractError::unresolved("/tmp/x").is_client_visible());
        assert!(!RefractError::temporary_state("/tmp/A.java", "locked").is_client_visible());
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            RefractError::unresolved("/a"),
            RefractError::unsupported_event("/a", "/b"),
            RefractError::engine("x"),
            RefractError::invalid_target(1, 0, "x"),
            RefractError::temporary_state("/a", "x"),
            RefractError::build_path("x"),
            RefractError::config("x"),
        ];
        let mut codes: Vec<_> = errors.iter().map(RefractError::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_invalid_target_message() {
        let err = RefractError::invalid_target(7, 5, "proposal index out of range");
        assert_eq!(
            err.to_string(),
            "Invalid resolve target (request 7, proposal 5): proposal index out of range"
        );
    }
}
