//! famixer: FAMIX models from resolved Java syntax trees
//!
//! Reads a project document (a binding table plus compilation units, as
//! produced by a Java front-end), walks it through the model builder and
//! exports the resulting model as MSE.

// Core engine - re-exported from famixer-core
pub use famixer_core::binding;
pub use famixer_core::builder;
pub use famixer_core::error;
pub use famixer_core::model;
pub use famixer_core::output;
pub use famixer_core::repository;
pub use famixer_core::syntax;

// Input
pub mod project;

// Traversal
pub mod driver;

// Front door
pub mod cli;

// Error bridges - converts loading errors to FamixerError
mod error_bridges;
