//! Binary entry point for the famixer CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Build the model of a project and write it as MSE
//! famixer import project.json --output model.mse
//!
//! # Key unresolved fields by their declaring type only
//! famixer import project.json --attribute-keying legacy
//!
//! # Report binding and element counts
//! famixer summary project.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use famixer::cli::{run_import, run_summary};
use famixer_core::builder::{AttributeKeying, BuilderOptions};
use famixer_core::error::{FamixerError, OutputErrorCode};
use famixer_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// FAMIX models from resolved Java syntax trees.
///
/// Reads a project document produced by a Java front-end and builds its
/// FAMIX model. All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "famixer", version, about = "FAMIX models from resolved Java syntax trees")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// How fields without a binding are keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum KeyingArg {
    /// Declaring type plus field name (default).
    #[default]
    Keyed,
    /// Declaring type only; unresolved fields of one type share an entry.
    Legacy,
}

impl From<KeyingArg> for AttributeKeying {
    fn from(arg: KeyingArg) -> Self {
        match arg {
            KeyingArg::Keyed => AttributeKeying::Keyed,
            KeyingArg::Legacy => AttributeKeying::Legacy,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the model of a project.
    Import {
        /// Project document (JSON).
        project: PathBuf,
        /// Write the model to this file as MSE.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Keying of fields that have no binding.
        #[arg(long, value_enum, default_value = "keyed")]
        attribute_keying: KeyingArg,
    },
    /// Report binding table size and model element counts.
    Summary {
        /// Project document (JSON).
        project: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), FamixerError> {
    match cli.command {
        Command::Import {
            project,
            output,
            attribute_keying,
        } => execute_import(project, output, attribute_keying),
        Command::Summary { project } => execute_summary(project),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_import(
    project: PathBuf,
    output: Option<PathBuf>,
    keying: KeyingArg,
) -> Result<(), FamixerError> {
    let options = BuilderOptions::default().with_attribute_keying(keying.into());
    let response = run_import(&project, output.as_deref(), options)?;
    emit_response(&response, &mut io::stdout()).map_err(|e| FamixerError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

fn execute_summary(project: PathBuf) -> Result<(), FamixerError> {
    let response = run_summary(&project)?;
    emit_response(&response, &mut io::stdout()).map_err(|e| FamixerError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
