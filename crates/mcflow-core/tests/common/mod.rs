//! Shared fixtures: an upstream checkout and a project in one in-memory tree.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use mcflow_adapters::{MemoryFilesystem, SimpleRenderer};
use mcflow_core::prelude::*;

pub const UPSTREAM: &str = "/home/dev/.claude-modsdk-workflow";
pub const PROJECT: &str = "/work/demo";

pub const CORE_DOCS: [&str; 7] = [
    "开发规范.md",
    "问题排查.md",
    "快速开始.md",
    "MODSDK核心概念.md",
    "API速查.md",
    "官方文档查询指南.md",
    "迁移指南-v15.0.md",
];

pub const CLAUDE_TEMPLATE_16: &str = "# {{PROJECT_NAME}}\n\n\
<!-- ==================== 项目配置区 START ==================== -->\n\
template config\n\
<!-- ==================== 项目配置区 END ==================== -->\n\n\
<!-- ==================== 工作流内容 START v16.1 ==================== -->\n\
workflow v{{VERSION}} for {{PROJECT_NAME}}\n\
<!-- ==================== 工作流内容 END v16.1 ==================== -->\n";

pub struct Fixture {
    pub fs: MemoryFilesystem,
}

impl Fixture {
    /// Upstream at `version` shipping every core doc, no project files yet.
    pub fn new(upstream_version: &str) -> Self {
        let fs = MemoryFilesystem::new().with_file(
            up("package.json"),
            format!(r#"{{ "name": "modsdk-workflow", "version": "{upstream_version}" }}"#),
        );
        for doc in CORE_DOCS {
            fs.insert(up(&format!("markdown/{doc}")), upstream_doc(doc, "v1"));
        }
        fs.insert(up("markdown/AI策略文档/strategy.md"), "# strategy\n");
        fs.insert(up("templates/CLAUDE.md.template"), CLAUDE_TEMPLATE_16);
        fs.insert(
            up("templates/.claude/commands/mc.md.template"),
            "# /mc for {{PROJECT_NAME}} ({{VERSION}})\n",
        );
        fs.insert(proj(".keep"), "");
        Self { fs }
    }

    pub fn ctx(&self) -> WorkflowContext {
        WorkflowContext::new(
            Box::new(self.fs.clone()),
            Box::new(SimpleRenderer::new()),
            UPSTREAM,
            PROJECT,
        )
        .at(Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap())
    }

    pub fn upstream_file(&self, rel: &str, content: &str) -> &Self {
        self.fs.insert(up(rel), content);
        self
    }

    pub fn project_file(&self, rel: &str, content: &str) -> &Self {
        self.fs.insert(proj(rel), content);
        self
    }

    pub fn read(&self, rel: &str) -> Option<String> {
        self.fs.read_file(proj(rel))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.fs.exists(std::path::Path::new(&proj(rel)))
    }

    /// A 15.x install: legacy version file plus docs copied into `markdown/`.
    pub fn install_v15(&self, version: &str) -> &Self {
        self.project_file(
            ".claude/workflow-version.json",
            &format!(r#"{{ "version": "{version}" }}"#),
        );
        for doc in CORE_DOCS {
            self.project_file(&format!("markdown/{doc}"), &upstream_doc(doc, "v1"));
        }
        self.project_file("markdown/ai/old-strategy.md", "# old\n");
        self
    }

    /// A manifest-based install at `version` with baselines of the current upstream.
    pub fn install_manifest(&self, version: &str) -> &Self {
        let ctx = self.ctx();
        let baselines = HashStore::new(&ctx).upstream_baselines();
        let hashes: serde_json::Map<String, serde_json::Value> = baselines
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v.as_str().to_string())))
            .collect();
        let manifest = serde_json::json!({
            "version": version,
            "baselineHashes": hashes,
            "installedAt": "2026-01-01T00:00:00Z",
        });
        self.project_file(
            ".claude/workflow-manifest.json",
            &serde_json::to_string_pretty(&manifest).unwrap(),
        )
    }

    pub fn manifest(&self) -> serde_json::Value {
        serde_json::from_str(&self.read(".claude/workflow-manifest.json").expect("manifest"))
            .expect("valid manifest json")
    }
}

pub fn upstream_doc(doc: &str, revision: &str) -> String {
    format!("# {doc}\n\nupstream content {revision}\n")
}

pub fn up(rel: &str) -> String {
    format!("{UPSTREAM}/{rel}")
}

pub fn proj(rel: &str) -> String {
    format!("{PROJECT}/{rel}")
}
