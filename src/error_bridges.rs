//! Error bridge implementations for project loading errors.
//!
//! This module provides `impl From<X> for FamixerError` conversions so that
//! command code can propagate loader failures with `?`.

use std::io;

use famixer_core::error::FamixerError;

use crate::project::ProjectError;

// ============================================================================
// Bridge: ProjectError -> FamixerError
// ============================================================================

impl From<ProjectError> for FamixerError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::Io { path, source } if source.kind() == io::ErrorKind::NotFound => {
                FamixerError::FileNotFound {
                    path: path.display().to_string(),
                }
            }
            ProjectError::Io { path, source } => FamixerError::InvalidProject {
                path: path.display().to_string(),
                message: source.to_string(),
            },
            ProjectError::Parse { path, source } => FamixerError::InvalidProject {
                path: path.display().to_string(),
                message: source.to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
