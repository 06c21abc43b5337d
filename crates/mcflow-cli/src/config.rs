//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `MCFLOW_<SECTION>__<KEY>`, e.g.
//!    `MCFLOW_DEPLOY__AUTO_CONFIRM=true`
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Name of the upstream checkout under the home directory.
pub const DEFAULT_UPSTREAM_DIR: &str = ".claude-modsdk-workflow";

/// Dotted keys accepted by `mcflow config get/set`.
pub const KEYS: [&str; 5] = [
    "workflow.home",
    "output.no_color",
    "output.format",
    "obsolete.rules_file",
    "deploy.auto_confirm",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workflow: WorkflowConfig,
    pub output: OutputConfig,
    pub obsolete: ObsoleteConfig,
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Upstream workflow checkout; `~/.claude-modsdk-workflow` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsoleteConfig {
    /// Extra rule table (JSON or TOML file, or a directory of them).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Treat every deploy as if `--yes` was passed.
    pub auto_confirm: bool,
}

impl AppConfig {
    /// Load defaults, then the config file if present, then the environment.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = config_file.cloned().unwrap_or_else(Self::config_path);
        if config_file.is_some() && !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        debug!(path = %path.display(), "Loading configuration");

        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("MCFLOW")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.mcflow.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "mcflow", "mcflow")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".mcflow.toml"))
    }

    /// Upstream root: `--upstream`/`MCFLOW_HOME`, then `workflow.home`, then
    /// `~/.claude-modsdk-workflow`.
    pub fn upstream_root(&self, flag: Option<&Path>) -> CliResult<PathBuf> {
        if let Some(dir) = flag.or(self.workflow.home.as_deref()) {
            return Ok(dir.to_path_buf());
        }
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DEFAULT_UPSTREAM_DIR))
            .ok_or_else(|| CliError::ConfigError {
                message: "cannot locate the home directory; pass --upstream".into(),
                source: None,
            })
    }

    /// Current value of a dotted key, as text.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let display = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        match key {
            "workflow.home" => Ok(display(&self.workflow.home)),
            "output.no_color" => Ok(self.output.no_color.to_string()),
            "output.format" => Ok(self.output.format.clone()),
            "obsolete.rules_file" => Ok(display(&self.obsolete.rules_file)),
            "deploy.auto_confirm" => Ok(self.deploy.auto_confirm.to_string()),
            _ => Err(unknown_key(key)),
        }
    }
}

fn unknown_key(key: &str) -> CliError {
    CliError::ConfigError {
        message: format!("Unknown config key: '{key}' (known: {})", KEYS.join(", ")),
        source: None,
    }
}

/// Write `key = value` into the TOML file at `path`, keeping other keys.
pub fn persist_key(path: &Path, key: &str, value: &str) -> CliResult<()> {
    let Some((section, field)) = key.split_once('.').filter(|_| KEYS.contains(&key)) else {
        return Err(unknown_key(key));
    };

    let mut doc: toml::Table = if path.is_file() {
        let raw = std::fs::read_to_string(path).map_err(|e| CliError::IoError {
            message: format!("Failed to read '{}'", path.display()),
            source: e,
        })?;
        toml::from_str(&raw).map_err(|e| CliError::ConfigError {
            message: format!("'{}' is not valid TOML", path.display()),
            source: Some(Box::new(e)),
        })?
    } else {
        toml::Table::new()
    };

    let parsed = match value {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        other if key.ends_with("no_color") || key.ends_with("auto_confirm") => {
            return Err(CliError::ConfigError {
                message: format!("'{key}' expects true or false, got '{other}'"),
                source: None,
            });
        }
        other => toml::Value::String(other.to_string()),
    };

    let table = doc
        .entry(section)
        .or_insert(toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(table) = table else {
        return Err(CliError::ConfigError {
            message: format!("'{section}' in '{}' is not a table", path.display()),
            source: None,
        });
    };
    table.insert(field.to_string(), parsed);

    let rendered = toml::to_string_pretty(&doc).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::IoError {
            message: format!("Failed to create config directory '{}'", parent.display()),
            source: e,
        })?;
    }
    std::fs::write(path, rendered).map_err(|e| CliError::IoError {
        message: format!("Failed to write config to '{}'", path.display()),
        source: e,
    })
}
