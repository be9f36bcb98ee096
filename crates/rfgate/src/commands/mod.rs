//! Command handlers and the settings they share.

pub mod config_cmd;
pub mod replay;

use std::path::PathBuf;

use clap::ValueEnum;

use rfgate_config::Config;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Flags resolved against the config file: a flag wins, then the file's
/// `[defaults]`.
pub struct Context {
    pub config: Config,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Context {
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = match &global.config {
            Some(path) => rfgate_config::load_config_from(path)?,
            None => rfgate_config::load_config()?,
        };

        let output = match global.output {
            Some(format) => format,
            None => parse_default("defaults.output", &config.defaults.output)?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => parse_default::<ColorMode>("defaults.color", &config.defaults.color)?,
        };

        Ok(Self {
            config,
            output,
            color: output::should_color(color),
            quiet: global.quiet,
        })
    }
}

fn parse_default<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// The config file this invocation reads and writes.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(rfgate_config::config_path)
}
