//! Project documents.
//!
//! A project is what a Java front-end hands over: one binding table shared by
//! every compilation unit, and the units themselves. It is read from a JSON
//! file of the shape `{ "bindings": {...}, "units": [...] }`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use famixer_core::binding::BindingTable;
use famixer_core::output::BindingCounts;
use famixer_core::syntax::CompilationUnit;

/// Failure to read a project document.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Binding table plus compilation units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub bindings: BindingTable,
    #[serde(default)]
    pub units: Vec<CompilationUnit>,
}

impl Project {
    /// Read and parse a project document.
    pub fn load(path: &Path) -> Result<Project, ProjectError> {
        let text = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let project = Project::from_json(&text).map_err(|source| ProjectError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            units = project.units.len(),
            "loaded project"
        );
        Ok(project)
    }

    /// Parse a project document from JSON text.
    pub fn from_json(text: &str) -> Result<Project, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Size of the binding table.
    pub fn binding_counts(&self) -> BindingCounts {
        BindingCounts {
            types: self.bindings.types.len(),
            methods: self.bindings.methods.len(),
            variables: self.bindings.variables.len(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
