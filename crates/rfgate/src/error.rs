//! CLI error types with miette diagnostics.
//!
//! Maps store and config failures into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use rfgate_config::ConfigError;
use rfgate_core::StoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const REJECTED: i32 = 4;
    pub const INVALID_TOPOLOGY: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Script ───────────────────────────────────────────────────────

    #[error("Could not read script {path}")]
    #[diagnostic(code(rfgate::script_io))]
    ScriptIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid replay script: {source}")]
    #[diagnostic(
        code(rfgate::script),
        help(
            "A script is a JSON array of steps:\n\
             {{\"enact\": {{\"description\": ..., \"actions\": [...]}}}}, \
             {{\"server\": {{...}}}}, \"undo\" or \"redo\"."
        )
    )]
    Script {
        #[source]
        source: serde_json::Error,
    },

    #[error("Step {step} was rejected by the store")]
    #[diagnostic(
        code(rfgate::rejected),
        help("Actions up to the failing one were applied; the rest of the script was not.")
    )]
    Rejected {
        step: usize,
        #[source]
        source: StoreError,
    },

    #[error("Topology has {count} validation error(s)")]
    #[diagnostic(code(rfgate::invalid_topology), help("Re-run without --strict to see the report only."))]
    InvalidTopology { count: usize },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(rfgate::config_exists), help("Pass --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(rfgate::config))]
    Config(#[from] ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rfgate::validation))]
    Validation { field: String, reason: String },

    // ── Output ────────────────────────────────────────────────────────

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::ConfigExists { .. } => exit_code::CONFIG,
            Self::Validation { .. } | Self::Script { .. } => exit_code::USAGE,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::InvalidTopology { .. } => exit_code::INVALID_TOPOLOGY,
            Self::ScriptIo { .. } | Self::Render(_) => exit_code::GENERAL,
        }
    }
}
