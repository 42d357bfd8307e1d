//! Core engine for famixer.
//!
//! This crate turns a partially resolved Java declaration tree into a FAMIX
//! model:
//! - Binding table and declaration syntax supplied by a front-end
//! - Entity registry interning named entities by qualified name
//! - Scope stack tracking the open declarations
//! - Type, member and relationship resolvers ([`builder::ModelBuilder`])
//! - Append-only model repository and MSE export
//! - Error types, error codes and JSON output types for CLI responses

pub mod binding;
pub mod builder;
pub mod error;
pub mod model;
pub mod mse;
pub mod output;
pub mod registry;
pub mod repository;
pub mod scope;
pub mod syntax;

pub use builder::{AttributeKeying, BuilderOptions, ModelBuilder};
pub use error::{ExportError, FamixerError, OutputErrorCode};
pub use repository::{ModelSummary, Repository};
