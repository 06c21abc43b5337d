//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "mcflow",
    bin_name = "mcflow",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Deploy and upgrade the MODSDK workflow docs in a project",
    long_about = "mcflow publishes the upstream MODSDK workflow documents into a \
                  project, runs version migrations, cleans up obsolete files and \
                  reports conflicts between project overrides and upstream updates.",
    after_help = "EXAMPLES:\n\
        \x20 mcflow deploy --yes\n\
        \x20 mcflow version ../my-addon\n\
        \x20 mcflow conflicts --list --output-format json\n\
        \x20 mcflow completions bash > /usr/share/bash-completion/completions/mcflow",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy or upgrade the workflow in a project.
    #[command(
        visible_alias = "d",
        about = "Deploy or upgrade the workflow",
        after_help = "EXAMPLES:\n\
            \x20 mcflow deploy                # upgrade when upstream is newer\n\
            \x20 mcflow deploy --sync         # re-publish even when up to date\n\
            \x20 mcflow deploy --reset --yes  # rebuild the manifest from scratch"
    )]
    Deploy(DeployArgs),

    /// Show local and upstream versions.
    #[command(visible_alias = "v", about = "Show installed and upstream versions")]
    Version(ProjectArgs),

    /// Find and handle files made obsolete by an upgrade.
    #[command(
        about = "Handle obsolete files",
        after_help = "EXAMPLES:\n\
            \x20 mcflow obsolete --list\n\
            \x20 mcflow obsolete --from 15.0 --to 21.0 --dry-run\n\
            \x20 mcflow obsolete --auto-confirm"
    )]
    Obsolete(ObsoleteArgs),

    /// Review project overrides whose upstream document changed.
    #[command(
        about = "Review override conflicts",
        after_help = "EXAMPLES:\n\
            \x20 mcflow conflicts --list\n\
            \x20 mcflow conflicts            # resolve one by one\n\
            \x20 mcflow conflicts --keep-all # acknowledge every upstream change"
    )]
    Conflicts(ConflictsArgs),

    /// Run pending version migrations.
    #[command(about = "Run pending migrations")]
    Migrate(MigrateArgs),

    /// Remove the workflow files from a project.
    #[command(
        about = "Remove workflow files",
        after_help = "EXAMPLES:\n\
            \x20 mcflow uninstall --dry-run\n\
            \x20 mcflow uninstall --yes --include-claude-md"
    )]
    Uninstall(UninstallArgs),

    /// Initialise an mcflow configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 mcflow init\n\
            \x20 mcflow init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 mcflow completions bash > ~/.local/share/bash-completion/completions/mcflow\n\
            \x20 mcflow completions zsh  > ~/.zfunc/_mcflow\n\
            \x20 mcflow completions fish > ~/.config/fish/completions/mcflow.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the mcflow configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 mcflow config get workflow.home\n\
            \x20 mcflow config set deploy.auto_confirm true\n\
            \x20 mcflow config list"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Target project; defaults to the current directory.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[arg(value_name = "PATH", help = "Project directory (default: current directory)")]
    pub path: Option<PathBuf>,
}

// ── deploy ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Re-run the sync path even when versions match.
    #[arg(long = "sync", help = "Re-publish even when up to date")]
    pub sync: bool,

    /// Rebuild the manifest, acknowledging every current upstream document.
    #[arg(
        long = "reset",
        visible_alias = "force",
        help = "Rewrite the manifest from scratch"
    )]
    pub reset: bool,

    /// Look for obsolete files across the whole version history.
    #[arg(long = "clean", help = "Check every obsolete-file rule")]
    pub clean: bool,

    #[arg(short = 'y', long = "yes", help = "Answer yes to every question")]
    pub yes: bool,
}

// ── obsolete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ObsoleteArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(long = "list", help = "Only list the obsolete files")]
    pub list: bool,

    #[arg(long = "dry-run", help = "Show what would happen without changing files")]
    pub dry_run: bool,

    #[arg(
        short = 'y',
        long = "auto-confirm",
        visible_alias = "yes",
        help = "Apply every action without asking"
    )]
    pub auto_confirm: bool,

    /// Version to start from (default: the installed version).
    #[arg(long = "from", value_name = "VERSION")]
    pub from: Option<String>,

    /// Version to end at (default: the upstream version).
    #[arg(long = "to", value_name = "VERSION")]
    pub to: Option<String>,
}

// ── conflicts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConflictsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(long = "list", help = "Only list the conflicts")]
    pub list: bool,

    #[arg(
        long = "accept-all",
        conflicts_with_all = ["keep_all", "list"],
        help = "Replace every override with the upstream document (backups kept)"
    )]
    pub accept_all: bool,

    #[arg(
        long = "keep-all",
        conflicts_with = "list",
        help = "Keep every override and acknowledge the upstream change"
    )]
    pub keep_all: bool,
}

// ── migrate ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(short = 'y', long = "yes", help = "Take the default answer everywhere")]
    pub yes: bool,

    #[arg(long = "once", help = "Run only the first pending migration")]
    pub once: bool,
}

// ── uninstall ─────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(short = 'y', long = "yes", help = "Skip the confirmation prompt")]
    pub yes: bool,

    #[arg(long = "dry-run", help = "Show what would be removed")]
    pub dry_run: bool,

    #[arg(long = "include-claude-md", help = "Also remove CLAUDE.md")]
    pub include_claude_md: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `mcflow init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `mcflow completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `mcflow config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `workflow.home`.
        key: String,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
