//! # Error Types
//!
//! Structured error types for csibot_core. Every rejection the translation
//! layer makes (unknown labels, out-of-range codes, a direction that does not
//! fit its coordinate system) is reported through [`BotError`] instead of
//! being skipped silently, so callers always learn why a host call was not made.
//!
//! ## Example
//!
//! ```rust
//! use csibot_core::codes::{HostCode, UnitSystem};
//! use csibot_core::errors::BotError;
//!
//! let err = UnitSystem::resolve("furlong_fortnight").unwrap_err();
//! assert!(matches!(err, BotError::UnrecognizedCode { .. }));
//! assert_eq!(err.error_code(), "UNRECOGNIZED_CODE");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for csibot_core operations
pub type BotResult<T> = Result<T, BotError>;

/// Structured error type for translation, forwarding and bootstrap.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BotError {
    /// A label or integer could not be mapped to a host enumeration
    #[error("Not recognized {kind}: {value}")]
    UnrecognizedCode { kind: String, value: String },

    /// A load direction is not valid in the requested coordinate system
    #[error("Direction '{direction}' is not valid in coordinate system '{csys}'")]
    IncompatibleCoordinateSystem { direction: String, csys: String },

    /// An input value is invalid (out of range, wrong shape, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Attaching to or starting the host application failed
    #[error("Failed to connect to host ({strategy}): {reason}")]
    LaunchFailed { strategy: String, reason: String },

    /// The host rejected a forwarded call with a non-zero return code
    #[error("Host call {operation} returned {ret_code}")]
    HostCall { operation: String, ret_code: i32 },

    /// A named object does not exist in the host model
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Model file is locked by another session
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// A script step failed; `step` is zero-based
    #[error("Script step {step} ({op}) failed: {source}")]
    ScriptFailed {
        step: usize,
        op: String,
        source: Box<BotError>,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BotError {
    /// Create an UnrecognizedCode error
    pub fn unrecognized(kind: impl Into<String>, value: impl Into<String>) -> Self {
        BotError::UnrecognizedCode {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Create an IncompatibleCoordinateSystem error
    pub fn incompatible_csys(direction: impl Into<String>, csys: impl Into<String>) -> Self {
        BotError::IncompatibleCoordinateSystem {
            direction: direction.into(),
            csys: csys.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        BotError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a LaunchFailed error
    pub fn launch_failed(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        BotError::LaunchFailed {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }

    /// Create a HostCall error
    pub fn host_call(operation: impl Into<String>, ret_code: i32) -> Self {
        BotError::HostCall {
            operation: operation.into(),
            ret_code,
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        BotError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        BotError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        BotError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Wrap an error raised while running a script step
    pub fn script_failed(step: usize, op: impl Into<String>, source: BotError) -> Self {
        BotError::ScriptFailed {
            step,
            op: op.into(),
            source: Box::new(source),
        }
    }

    /// Bootstrap failures end the process; everything else can be reported and retried
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::LaunchFailed { .. })
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BotError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BotError::UnrecognizedCode { .. } => "UNRECOGNIZED_CODE",
            BotError::IncompatibleCoordinateSystem { .. } => "INCOMPATIBLE_CSYS",
            BotError::InvalidInput { .. } => "INVALID_INPUT",
            BotError::LaunchFailed { .. } => "LAUNCH_FAILED",
            BotError::HostCall { .. } => "HOST_CALL_FAILED",
            BotError::NotFound { .. } => "NOT_FOUND",
            BotError::FileError { .. } => "FILE_ERROR",
            BotError::FileLocked { .. } => "FILE_LOCKED",
            BotError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BotError::VersionMismatch { .. } => "VERSION_MISMATCH",
            BotError::ScriptFailed { .. } => "SCRIPT_FAILED",
            BotError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BotError::unrecognized("units", "furlong_fortnight");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: BotError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BotError::unrecognized("units", "x").error_code(), "UNRECOGNIZED_CODE");
        assert_eq!(BotError::incompatible_csys("Gravity", "Local").error_code(), "INCOMPATIBLE_CSYS");
        assert_eq!(BotError::host_call("SetMaterial", 1).error_code(), "HOST_CALL_FAILED");
    }

    #[test]
    fn test_unrecognized_message() {
        let err = BotError::unrecognized("units", "kip_yd_F");
        assert_eq!(err.to_string(), "Not recognized units: kip_yd_F");
    }

    #[test]
    fn test_script_failure_wraps_source() {
        let inner = BotError::incompatible_csys("Local 1", "Global");
        let err = BotError::script_failed(3, "assign_frame_dist_load", inner.clone());
        match err {
            BotError::ScriptFailed { step, source, .. } => {
                assert_eq!(step, 3);
                assert_eq!(*source, inner);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_only_launch_failures_are_fatal() {
        assert!(BotError::launch_failed("attach", "no instance").is_fatal());
        assert!(!BotError::host_call("Save", 1).is_fatal());
        assert!(BotError::file_locked("a.edb", "me", "now").is_recoverable());
    }
}
