//! `mcflow config`: read and write configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::{AppConfig, persist_key},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = global.config.unwrap_or_else(AppConfig::config_path);

    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            output.print(&format!("{key} = {value:?}"))?;
        }

        ConfigCommands::Set { key, value } => {
            persist_key(&path, &key, &value)?;
            output.success(&format!("{key} = {value:?} written to {}", path.display()))?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}
