//! Error types and error code constants for famixer.
//!
//! Model construction itself never fails: unresolved references degrade to
//! stubs. What can fail is reading the project document and writing the
//! exported model.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Input errors (project file missing or malformed)
//! - `4`: Export errors (failed to write the model)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Project document not found or not valid.
    InputError = 3,
    /// Failed to write the exported model.
    ExportError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Export Errors
// ============================================================================

/// Failure to write an exported model.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination could not be created or written.
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    /// Destination the export was writing to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExportError::Io { path, .. } => path,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum FamixerError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Project file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Project file exists but is not a valid project document.
    #[error("invalid project {path}: {message}")]
    InvalidProject { path: String, message: String },

    /// Writing the model failed.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl FamixerError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        FamixerError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        FamixerError::InternalError {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&FamixerError> for OutputErrorCode {
    fn from(err: &FamixerError) -> Self {
        match err {
            FamixerError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            FamixerError::FileNotFound { .. } => OutputErrorCode::InputError,
            FamixerError::InvalidProject { .. } => OutputErrorCode::InputError,
            FamixerError::Export(_) => OutputErrorCode::ExportError,
            FamixerError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<FamixerError> for OutputErrorCode {
    fn from(err: FamixerError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================
