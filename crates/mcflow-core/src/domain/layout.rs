//! Catalogue of workflow-managed paths.
//!
//! Everything that hashes, publishes, migrates or uninstalls workflow files
//! reads its file lists from [`ManagedFiles`], so the set of hashed documents
//! and the set of migrated documents cannot drift apart.

/// Project and upstream paths owned by the workflow, relative to their roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedFiles {
    core_docs: Vec<String>,
    core_dirs: Vec<String>,
    legacy_core_dirs: Vec<String>,
    commands: Vec<String>,
    legacy_commands: Vec<String>,
}

impl ManagedFiles {
    pub const MANIFEST: &'static str = ".claude/workflow-manifest.json";
    pub const LEGACY_VERSION: &'static str = ".claude/workflow-version.json";
    pub const WORKFLOW_STATE: &'static str = ".claude/workflow-state.json";
    pub const CORE_DOCS_DIR: &'static str = ".claude/core-docs";
    pub const COMMANDS_DIR: &'static str = ".claude/commands";

    pub const MARKDOWN_DIR: &'static str = "markdown";
    pub const OVERRIDE_DIR: &'static str = "markdown/core";
    pub const DOCS_README: &'static str = "markdown/README.md";
    pub const TASKS_DIR: &'static str = "tasks";
    pub const TASK_META: &'static str = ".task-meta.json";
    pub const CLAUDE_MD: &'static str = "CLAUDE.md";

    pub const OBSOLETE_BACKUP_DIR: &'static str = ".backup-obsolete";
    pub const V15_BACKUP_DIR: &'static str = ".backup-v15";
    pub const V20_BACKUP_DIR: &'static str = ".backup-v20";

    /// Upstream-side paths.
    pub const UPSTREAM_PACKAGE: &'static str = "package.json";
    pub const UPSTREAM_DOCS_DIR: &'static str = "markdown";
    pub const CLAUDE_TEMPLATE: &'static str = "templates/CLAUDE.md.template";
    pub const COMMAND_TEMPLATES_DIR: &'static str = "templates/.claude/commands";

    /// The catalogue shipped with the current workflow line.
    pub fn standard() -> Self {
        Self {
            core_docs: [
                "开发规范.md",
                "问题排查.md",
                "快速开始.md",
                "MODSDK核心概念.md",
                "API速查.md",
                "官方文档查询指南.md",
                "迁移指南-v15.0.md",
            ]
            .map(String::from)
            .to_vec(),
            core_dirs: vec!["AI策略文档".into()],
            legacy_core_dirs: vec!["ai".into()],
            commands: [
                "mc.md",
                "mc-review.md",
                "mc-perf.md",
                "mc-docs.md",
                "mc-why.md",
                "mc-discover.md",
            ]
            .map(String::from)
            .to_vec(),
            legacy_commands: ["cc.md", "validate-docs.md", "enhance-docs.md"]
                .map(String::from)
                .to_vec(),
        }
    }

    /// Override-able core documents, relative to `markdown/`.
    pub fn core_docs(&self) -> &[String] {
        &self.core_docs
    }

    /// Core directories published next to the core documents.
    pub fn core_dirs(&self) -> &[String] {
        &self.core_dirs
    }

    /// Core directories deployed by 15.x, relative to `markdown/`.
    pub fn legacy_core_dirs(&self) -> &[String] {
        &self.legacy_core_dirs
    }

    /// Command files rendered into `.claude/commands/`.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Command files used by the 16.x line.
    pub fn legacy_commands(&self) -> &[String] {
        &self.legacy_commands
    }

    pub fn is_core_doc(&self, file: &str) -> bool {
        self.core_docs.iter().any(|d| d == file)
    }

    /// Upstream template for a command file.
    pub fn command_template(name: &str) -> String {
        format!("{}/{}.template", Self::COMMAND_TEMPLATES_DIR, name)
    }

    /// Project files removed by uninstall, in removal order.
    pub fn uninstall_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .commands
            .iter()
            .chain(&self.legacy_commands)
            .map(|c| format!("{}/{}", Self::COMMANDS_DIR, c))
            .collect();

        targets.push(Self::CORE_DOCS_DIR.into());
        targets.push(Self::LEGACY_VERSION.into());
        targets.push(Self::WORKFLOW_STATE.into());
        targets.extend(
            self.core_docs
                .iter()
                .chain(&self.legacy_core_dirs)
                .map(|d| format!("{}/{}", Self::MARKDOWN_DIR, d)),
        );
        targets.push(Self::MANIFEST.into());
        targets
    }

    /// Project paths uninstall never touches.
    pub fn preserved_user_paths() -> &'static [&'static str] {
        &[
            "tasks",
            "markdown/systems",
            "markdown/states",
            "markdown/presets",
            "markdown/managers",
            "markdown/core",
            "markdown/README.md",
            ".claude/discovered-patterns.json",
        ]
    }
}

impl Default for ManagedFiles {
    fn default() -> Self {
        Self::standard()
    }
}
