//! CLI front door.
//!
//! Command implementations for the `famixer` binary:
//! - `import` - Build the model of a project and optionally export it as MSE
//! - `summary` - Report binding table size and model element counts
//!
//! ## Error Handling
//!
//! All functions return `Result<T, FamixerError>`. The caller (`main.rs`)
//! turns errors into a JSON error response and an exit code.

use std::path::Path;

use famixer_core::builder::BuilderOptions;
use famixer_core::error::FamixerError;
use famixer_core::output::{ImportResponse, SummaryResponse};
use tracing::info;

use crate::driver::build_model;
use crate::project::Project;

/// Build the model of the project at `project_path`.
///
/// When `output` is given the model is written there as MSE.
pub fn run_import(
    project_path: &Path,
    output: Option<&Path>,
    options: BuilderOptions,
) -> Result<ImportResponse, FamixerError> {
    if let Some(output) = output {
        if output.is_dir() {
            return Err(FamixerError::invalid_args(format!(
                "output path is a directory: {}",
                output.display()
            )));
        }
    }

    let project = Project::load(project_path)?;
    let repository = build_model(&project, options);
    let summary = repository.summary();
    info!(elements = repository.len(), "model built");

    let output = match output {
        Some(path) => {
            repository.export_mse(path)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    Ok(ImportResponse::new(
        project_path.display().to_string(),
        project.units.len(),
        output,
        summary,
    ))
}

/// Count what the project at `project_path` holds and what it builds into.
pub fn run_summary(project_path: &Path) -> Result<SummaryResponse, FamixerError> {
    let project = Project::load(project_path)?;
    let repository = build_model(&project, BuilderOptions::default());
    Ok(SummaryResponse::new(
        project_path.display().to_string(),
        project.units.len(),
        project.binding_counts(),
        repository.summary(),
    ))
}

// ============================================================================
// Tests
// ============================================================================
