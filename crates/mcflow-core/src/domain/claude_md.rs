//! `CLAUDE.md` region handling.
//!
//! Between 16.1 and 17.x the project's `CLAUDE.md` was split into four regions
//! delimited by HTML comment markers:
//!
//! ```text
//! <!-- ==================== 项目配置区 START ==================== -->
//! ...
//! <!-- ==================== 项目配置区 END ==================== -->
//! ```
//!
//! 16.1 rewrites the workflow region and keeps the user regions; 18.0 drops
//! the markers entirely.

use std::sync::LazyLock;

use regex::Regex;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ProjectConfig,
    Workflow,
    ProjectExtension,
    Metadata,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Self::ProjectConfig,
        Self::Workflow,
        Self::ProjectExtension,
        Self::Metadata,
    ];

    /// Marker name as it appears in the document.
    pub fn marker(self) -> &'static str {
        match self {
            Self::ProjectConfig => "项目配置区",
            Self::Workflow => "工作流内容",
            Self::ProjectExtension => "项目扩展区",
            Self::Metadata => "文档元数据区",
        }
    }
}

static WORKFLOW_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- ={20} 工作流内容 START").expect("Invalid workflow marker regex")
});

static REGION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- ={20} (?:项目配置区|工作流内容|项目扩展区|文档元数据区) (?:START|END)[^>]*-->")
        .expect("Invalid region marker regex")
});

static EDIT_HINTS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"<!--\s*用户可编辑[：:][^>]*-->\s*").expect("Invalid edit hint regex"),
        Regex::new(r"<!--\s*⚠️\s*[^>]*-->\s*").expect("Invalid warning hint regex"),
        Regex::new(r"<!--\s*自动生成[^>]*-->\s*").expect("Invalid generated hint regex"),
    ]
});

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid blank run regex"));

/// Marker the 16.1 layout leaves at the top of the user's extension region.
const EXTENSION_ANCHOR: &str = "<!-- 在此下方添加项目特定规范 -->";

/// Trimmed content between a section's START and END markers.
pub fn extract_section(content: &str, section: Section) -> Result<Option<String>, DomainError> {
    let name = regex::escape(section.marker());
    let pattern = format!(r"(?s)<!-- =+ {name} START[^>]*-->(.*?)<!-- =+ {name} END[^>]*-->");
    let re = Regex::new(&pattern).map_err(|e| DomainError::InvalidSectionPattern {
        section: section.marker().into(),
        reason: e.to_string(),
    })?;

    Ok(re
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string()))
}

/// Does the document still carry the workflow-managed region?
pub fn has_workflow_markers(content: &str) -> bool {
    WORKFLOW_START.is_match(content)
}

/// Remove every region marker and editing hint, collapse blank-line runs.
pub fn strip_workflow_markers(content: &str) -> String {
    let mut cleaned = REGION_MARKER.replace_all(content, "").into_owned();
    for hint in EDIT_HINTS.iter() {
        cleaned = hint.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = BLANK_RUNS.replace_all(&cleaned, "\n\n");
    format!("{}\n", cleaned.trim())
}

fn marker(section: Section, edge: &str, suffix: &str) -> String {
    format!(
        "<!-- ==================== {} {edge}{suffix} ==================== -->",
        section.marker()
    )
}

/// Regions carried into a 16.1 document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeMdParts {
    pub project_config: String,
    pub workflow: String,
    pub project_extension: String,
}

/// Build the four-region 16.1 document.
pub fn assemble_v16_1(parts: &ClaudeMdParts, version: &str, date: &str) -> String {
    let extension = if parts.project_extension.contains(EXTENSION_ANCHOR) {
        parts.project_extension.clone()
    } else {
        format!("{}\n{}", extension_preamble(), parts.project_extension)
    };

    let header = format!(
        "# CLAUDE.md\n\n\
         > 🤖 **MODSDK 开发工作流项目参考文档 v16.1**\n\
         >\n\
         > **当前版本**: v16.1 (双层文档架构 + 项目扩展区)\n\
         > **最后更新**: {date}\n\n\
         ---\n"
    );

    let config = format!(
        "{}\n<!-- 用户可编辑：基础项目信息 -->\n\n{}\n\n{}\n",
        marker(Section::ProjectConfig, "START", ""),
        parts.project_config,
        marker(Section::ProjectConfig, "END", ""),
    );

    let workflow = format!(
        "{}\n\
         <!-- ⚠️ 警告：以下内容由工作流自动管理，升级时会精确替换此区域 -->\n\
         <!-- ⚠️ 请勿手动编辑，所有修改将在升级时丢失 -->\n\
         <!-- ⚠️ 如需添加项目特定规范，请使用下方的\"项目扩展区\" -->\n\n\
         {}\n\n{}\n",
        marker(Section::Workflow, "START", " v16.1"),
        parts.workflow,
        marker(Section::Workflow, "END", " v16.1"),
    );

    let ext = format!(
        "{}\n\
         <!-- 用户可编辑：添加项目特定规范 -->\n\
         <!-- ⚠️ 本区域内容会在升级时自动保留 -->\n\n\
         {}\n\n{}\n",
        marker(Section::ProjectExtension, "START", ""),
        extension.trim_end(),
        marker(Section::ProjectExtension, "END", ""),
    );

    let metadata = format!(
        "{}\n\
         <!-- 自动生成，升级时更新 -->\n\n\
         **文档元数据**：\n\
         - 工作流版本：v{version}\n\
         - 上游仓库：MODSDK 开发工作流\n\
         - 生成时间：{date}\n\n{}\n",
        marker(Section::Metadata, "START", ""),
        marker(Section::Metadata, "END", ""),
    );

    [header, config, workflow, ext, metadata].join("\n")
}

fn extension_preamble() -> String {
    format!(
        "## 🎯 项目特定规范\n\n\
         > 💡 **使用说明**：\n\
         >\n\
         > 在此添加**非MODSDK相关**的项目特定规范，例如团队协作流程、自定义架构模式、命名约定。\n\
         > MODSDK API/事件规范应放在 `markdown/core/开发规范.md`。\n\n\
         {EXTENSION_ANCHOR}"
    )
}

/// Project config region for documents that never had one.
pub fn default_project_config(name: &str, path: &str, date: &str) -> String {
    format!(
        "## 📌 项目信息\n\n\
         **项目名称**: {name}\n\
         **项目路径**: `{path}`\n\
         **创建日期**: {date}\n\
         **项目状态**: 生产就绪 (Production Ready)"
    )
}

/// The user-owned `CLAUDE.md` written by the 18.0 "simplify" choice.
pub fn minimal_template(name: &str, path: &str, date: &str) -> String {
    format!(
        "# {name}\n\n\
         > **项目路径**: `{path}`\n\
         > **创建日期**: {date}\n\n\
         ---\n\n\
         ## 📌 项目说明\n\n\
         （请在此添加项目说明）\n\n\
         ---\n\n\
         ## 🎯 项目规范\n\n\
         （请在此添加项目特定的开发规范）\n\n\
         ---\n\n\
         ## 📚 文档索引\n\n\
         - [Systems文档](./markdown/systems/)\n\
         - [项目文档](./markdown/)\n\
         - [核心文档](./.claude/core-docs/)\n\n\
         ---\n\n\
         > 💡 **提示**：本文档完全由项目维护者管理。\n\
         >\n\
         > MODSDK开发工作流通过 `/mc` 系列命令提供，详见 [.claude/commands/](./.claude/commands/)。\n"
    )
}
