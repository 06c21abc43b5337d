//! `mcflow init`: create a default configuration file.

use std::path::Path;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Write the default configuration to `--config` or the platform path.
pub fn execute(args: InitArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let config_path = global.config.unwrap_or_else(AppConfig::config_path);

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    write_default(&config_path)?;
    output.success(&format!(
        "Configuration created at {}",
        config_path.display(),
    ))?;
    output.detail("set workflow.home if the upstream checkout is not in ~/.claude-modsdk-workflow")?;
    Ok(())
}

fn write_default(path: &Path) -> CliResult<()> {
    let toml = toml::to_string_pretty(&AppConfig::default()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::IoError {
            message: format!("Failed to create config directory '{}'", parent.display()),
            source: e,
        })?;
    }

    std::fs::write(path, &toml).map_err(|e| CliError::IoError {
        message: format!("Failed to write config to '{}'", path.display()),
        source: e,
    })
}
