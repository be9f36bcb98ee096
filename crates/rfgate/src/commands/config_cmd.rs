//! Config subcommand handlers.

use rfgate_config::{Config, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::commands::{Context, config_file};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_file(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let ctx = Context::resolve(global)?;
            // Table and plain both show the file as it would be written.
            let out = match ctx.output {
                OutputFormat::Table | OutputFormat::Plain => config_toml(&ctx.config)?,
                format => {
                    output::render(format, &ctx.config, |_| String::new(), |_| String::new())?
                }
            };
            output::print_output(out.trim_end(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config_file(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            save_config_to(&Config::default(), &path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            output::print_output(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }
    }
}

fn config_toml(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_renders_every_section() {
        let text = config_toml(&Config::default()).unwrap();
        assert!(text.contains("[defaults]"));
        assert!(text.contains("[layout]"));
        assert!(text.contains("undo_limit = 100"));
    }
}
