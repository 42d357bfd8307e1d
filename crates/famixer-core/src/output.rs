//! JSON output types and serialization for CLI responses.
//!
//! Every response has `status` as its first field and carries the
//! `schema_version`, so callers can parse stdout without guessing.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{FamixerError, OutputErrorCode};
use crate::repository::ModelSummary;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the `import` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Project document that was read.
    pub project: String,
    /// Number of compilation units visited.
    pub units: usize,
    /// Where the MSE model was written, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Element counts per kind.
    pub summary: ModelSummary,
}

impl ImportResponse {
    /// Create a successful import response.
    pub fn new(
        project: impl Into<String>,
        units: usize,
        output: Option<String>,
        summary: ModelSummary,
    ) -> Self {
        ImportResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            project: project.into(),
            units,
            output,
            summary,
        }
    }
}

/// Response for the `summary` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Project document that was read.
    pub project: String,
    /// Number of compilation units.
    pub units: usize,
    /// Number of type, method and variable bindings.
    pub bindings: BindingCounts,
    /// Element counts per kind.
    pub summary: ModelSummary,
    /// Total number of model elements.
    pub total: usize,
}

/// Size of a project's binding table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingCounts {
    pub types: usize,
    pub methods: usize,
    pub variables: usize,
}

impl SummaryResponse {
    /// Create a successful summary response.
    pub fn new(
        project: impl Into<String>,
        units: usize,
        bindings: BindingCounts,
        summary: ModelSummary,
    ) -> Self {
        SummaryResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            project: project.into(),
            units,
            bindings,
            total: summary.total(),
            summary,
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// File the error is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorInfo {
    /// Create from a FamixerError.
    pub fn from_error(err: &FamixerError) -> Self {
        let path = match err {
            FamixerError::FileNotFound { path } => Some(path.clone()),
            FamixerError::InvalidProject { path, .. } => Some(path.clone()),
            FamixerError::Export(export) => Some(export.path().display().to_string()),
            FamixerError::InvalidArguments { .. } | FamixerError::InternalError { .. } => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            path,
        }
    }
}

/// Response emitted when a command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a FamixerError.
    pub fn from_error(err: &FamixerError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emit
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
