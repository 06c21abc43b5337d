//! Integration tests for the mcflow binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

const CORE_DOCS: [&str; 7] = [
    "开发规范.md",
    "问题排查.md",
    "快速开始.md",
    "MODSDK核心概念.md",
    "API速查.md",
    "官方文档查询指南.md",
    "迁移指南-v15.0.md",
];

const CLAUDE_TEMPLATE: &str = "# {{PROJECT_NAME}}\n\n\
<!-- ==================== 项目配置区 START ==================== -->\n\
config\n\
<!-- ==================== 项目配置区 END ==================== -->\n";

/// An upstream checkout, a project directory and an empty config file.
struct Workspace {
    _root: TempDir,
    upstream: PathBuf,
    project: PathBuf,
    config: PathBuf,
}

impl Workspace {
    fn new(upstream_version: &str) -> Self {
        let root = TempDir::new().unwrap();
        let upstream = root.path().join("upstream");
        let project = root.path().join("demo");
        let config = root.path().join("config.toml");

        write(
            &upstream.join("package.json"),
            &format!(r#"{{ "name": "modsdk-workflow", "version": "{upstream_version}" }}"#),
        );
        for doc in CORE_DOCS {
            write(
                &upstream.join("markdown").join(doc),
                &format!("# {doc}\n\nupstream content\n"),
            );
        }
        write(
            &upstream.join("markdown/AI策略文档/strategy.md"),
            "# strategy\n",
        );
        write(&upstream.join("templates/CLAUDE.md.template"), CLAUDE_TEMPLATE);
        write(
            &upstream.join("templates/.claude/commands/mc.md.template"),
            "# /mc for {{PROJECT_NAME}} ({{VERSION}})\n",
        );
        fs::create_dir_all(&project).unwrap();
        fs::write(&config, "").unwrap();

        Self {
            _root: root,
            upstream,
            project,
            config,
        }
    }

    /// `mcflow -c <config> --upstream <upstream> <args..>`, run in the project.
    fn mcflow(&self, args: &[&str]) -> assert_cmd::Command {
        let mut cmd = cargo::cargo_bin_cmd!("mcflow");
        cmd.current_dir(&self.project)
            .env_remove("MCFLOW_HOME")
            .arg("-c")
            .arg(&self.config)
            .arg("--upstream")
            .arg(&self.upstream)
            .args(args);
        cmd
    }

    fn project_file(&self, rel: &str) -> PathBuf {
        self.project.join(rel)
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_help_flag() {
    cargo::cargo_bin_cmd!("mcflow")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("conflicts"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_version_flag() {
    cargo::cargo_bin_cmd!("mcflow")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_first_deploy_publishes_workflow() {
    let ws = Workspace::new("21.0.0");

    ws.mcflow(&["deploy", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deploying workflow v21.0.0"));

    for doc in CORE_DOCS {
        assert!(ws.project_file(&format!(".claude/core-docs/{doc}")).is_file(), "{doc}");
    }
    assert_eq!(
        fs::read_to_string(ws.project_file(".claude/commands/mc.md")).unwrap(),
        "# /mc for demo (21.0.0)\n"
    );

    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(ws.project_file(".claude/workflow-manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["version"], "21.0.0");
}

#[test]
fn test_second_deploy_is_up_to_date() {
    let ws = Workspace::new("21.0.0");
    ws.mcflow(&["deploy", "--yes"]).assert().success();

    ws.mcflow(&["deploy", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date"));
}

#[test]
fn test_version_json_before_and_after_deploy() {
    let ws = Workspace::new("21.0.0");

    let out = ws
        .mcflow(&["--output-format", "json", "version"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let before: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(before["upstream"], "21.0.0");
    assert_eq!(before["needsUpdate"], true);

    ws.mcflow(&["deploy", "--yes"]).assert().success();

    let out = ws
        .mcflow(&["--output-format", "json", "version"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let after: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(after["local"], "21.0.0");
    assert_eq!(after["needsUpdate"], false);
    assert!(after["pendingMigrations"].as_array().unwrap().is_empty());
}

#[test]
fn test_conflicts_none_after_fresh_deploy() {
    let ws = Workspace::new("21.0.0");
    ws.mcflow(&["deploy", "--yes"]).assert().success();

    ws.mcflow(&["conflicts", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No override conflicts"));
}

#[test]
fn test_obsolete_list_json_is_an_array() {
    let ws = Workspace::new("21.0.0");
    ws.mcflow(&["deploy", "--yes"]).assert().success();

    let out = ws
        .mcflow(&["--output-format", "json", "obsolete", "--list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(listed.is_array());
}

#[test]
fn test_migrate_with_nothing_pending() {
    let ws = Workspace::new("21.0.0");
    ws.mcflow(&["deploy", "--yes"]).assert().success();

    ws.mcflow(&["migrate", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No migration needed"));
}

#[test]
fn test_uninstall_dry_run_keeps_files() {
    let ws = Workspace::new("21.0.0");
    ws.mcflow(&["deploy", "--yes"]).assert().success();

    ws.mcflow(&["uninstall", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would remove"))
        .stdout(predicate::str::contains(".claude/core-docs"));

    assert!(ws.project_file(".claude/workflow-manifest.json").is_file());
}

#[test]
fn test_uninstall_with_yes_removes_managed_files() {
    let ws = Workspace::new("21.0.0");
    ws.mcflow(&["deploy", "--yes"]).assert().success();

    ws.mcflow(&["uninstall", "--yes"]).assert().success();

    assert!(!ws.project_file(".claude/workflow-manifest.json").exists());
    assert!(!ws.project_file(".claude/core-docs").exists());
}

#[test]
fn test_completions_bash() {
    cargo::cargo_bin_cmd!("mcflow")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mcflow"));
}

#[test]
fn test_config_set_then_get() {
    let ws = Workspace::new("21.0.0");

    ws.mcflow(&["config", "set", "deploy.auto_confirm", "true"])
        .assert()
        .success();
    ws.mcflow(&["config", "get", "deploy.auto_confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy.auto_confirm = \"true\""));
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("mcflow.toml");

    cargo::cargo_bin_cmd!("mcflow")
        .arg("init")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration created"));
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[deploy]"));
    assert!(written.contains("auto_confirm = false"));

    fs::write(&path, "[deploy]\nauto_confirm = true\n").unwrap();
    cargo::cargo_bin_cmd!("mcflow")
        .arg("init")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert!(fs::read_to_string(&path).unwrap().contains("auto_confirm = true"));

    cargo::cargo_bin_cmd!("mcflow")
        .args(["init", "--force", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("auto_confirm = false"));
}
