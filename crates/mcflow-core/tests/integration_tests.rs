//! End-to-end tests for version reconciliation, obsolete files, conflicts,
//! deploy and uninstall.

mod common;

use std::path::{Path, PathBuf};

use common::{CORE_DOCS, Fixture, PROJECT, UPSTREAM, proj, upstream_doc};
use mcflow_adapters::{Answer, MemoryFilesystem, ScriptedPrompt, SimpleRenderer};
use mcflow_core::{
    application::{
        ApplicationError,
        migrations::{MigrationV16, MigrationV16_1, MigrationV18},
        services::{ObsoleteOutcome, UninstallOptions},
    },
    prelude::*,
};

fn v(s: &str) -> Version {
    Version::parse(s)
}

#[test]
fn test_scenario_upgrade_from_15_1_selects_v16_only() {
    let fx = Fixture::new("16.0.0");
    fx.install_v15("15.1.0");
    fx.project_file("x.json", "{}");
    let ctx = fx.ctx();

    let check = VersionResolver::new(&ctx).check();
    assert_eq!(check.local, v("15.1.0"));
    assert_eq!(check.upstream, v("16.0.0"));
    assert!(check.needs_update);

    let mut registry = RuleRegistry::new();
    registry.add(ObsoleteRule::new(v("15.0.0"), v("16.0.0"), ObsoleteAction::Backup, "old").file("x.json"));
    let matches = ObsoleteFileEngine::new(&ctx, &registry).detect(check.local, check.upstream);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].file, "x.json");

    assert!(MigrationV16.needs_migration(&ctx));
    assert!(!MigrationV16_1.needs_migration(&ctx));
    assert!(!MigrationV18.needs_migration(&ctx));
}

#[test]
fn test_scenario_override_conflict_reports_both_hashes() {
    let fx = Fixture::new("21.0.0");
    let h1 = ContentHash::of(b"a v1\n");
    fx.upstream_file("markdown/a.md", "a v2\n");
    fx.project_file("markdown/core/a.md", "my a\n");
    fx.project_file(
        ".claude/workflow-manifest.json",
        &format!(
            r#"{{ "version": "21.0.0", "baselineHashes": {{ "a.md": "{}" }} }}"#,
            h1.as_str()
        ),
    );
    let ctx = fx.ctx();

    let manifest = ManifestStore::new(&ctx).load().unwrap().unwrap();
    let conflicts = OverrideConflictDetector::new(&ctx).detect(&manifest).unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].file, "a.md");
    assert_eq!(conflicts[0].old_baseline_hash, h1);
    assert_eq!(conflicts[0].new_baseline_hash, ContentHash::of(b"a v2\n"));
}

#[test]
fn test_no_conflict_without_recorded_baseline_or_change() {
    let fx = Fixture::new("21.0.0");
    fx.upstream_file("markdown/same.md", "same\n");
    fx.upstream_file("markdown/new.md", "new\n");
    fx.project_file("markdown/core/same.md", "mine\n");
    fx.project_file("markdown/core/new.md", "mine\n");
    fx.project_file("markdown/core/notes.txt", "not markdown\n");
    fx.project_file(
        ".claude/workflow-manifest.json",
        &format!(
            r#"{{ "version": "21.0.0", "baselineHashes": {{ "same.md": "{}" }} }}"#,
            ContentHash::of(b"same\n").as_str()
        ),
    );
    let ctx = fx.ctx();

    let manifest = ManifestStore::new(&ctx).read();
    assert!(OverrideConflictDetector::new(&ctx).detect(&manifest).unwrap().is_empty());
}

#[test]
fn test_scenario_obsolete_backup_moves_file() {
    let fx = Fixture::new("16.0.0");
    fx.project_file("x.json", r#"{"k":1}"#);
    let ctx = fx.ctx();

    let mut registry = RuleRegistry::new();
    registry.add(ObsoleteRule::new(v("15.0.0"), v("16.0.0"), ObsoleteAction::Backup, "old").file("x.json"));
    let engine = ObsoleteFileEngine::new(&ctx, &registry);
    let matches = engine.detect(v("15.0.0"), v("16.0.0"));
    let report = engine
        .process(
            &matches,
            ObsoleteOptions {
                auto_confirm: true,
                dry_run: false,
            },
            &AutoConfirm,
        )
        .unwrap();

    assert!(!fx.exists("x.json"));
    assert_eq!(fx.read(".backup-obsolete/x.json").as_deref(), Some(r#"{"k":1}"#));
    assert_eq!(report.stats.backed, 1);
    assert_eq!(report.stats.changed(), 1);
}

#[test]
fn test_obsolete_dry_run_changes_nothing() {
    let fx = Fixture::new("21.0.0");
    fx.install_v15("15.0.0");
    fx.project_file(".claude/workflow-config.json", "{}");
    let before: Vec<_> = fx
        .fs
        .list_files()
        .into_iter()
        .map(|p| (p.clone(), fx.fs.read_file(&p)))
        .collect();

    let ctx = fx.ctx();
    let registry = RuleRegistry::with_defaults();
    let engine = ObsoleteFileEngine::new(&ctx, &registry);
    let matches = engine.detect(v("15.0.0"), v("21.0.0"));
    let report = engine
        .process(
            &matches,
            ObsoleteOptions {
                auto_confirm: false,
                dry_run: true,
            },
            &ScriptedPrompt::new([]),
        )
        .unwrap();

    let after: Vec<_> = fx
        .fs
        .list_files()
        .into_iter()
        .map(|p| (p.clone(), fx.fs.read_file(&p)))
        .collect();
    assert_eq!(before, after);
    assert_eq!(report.stats.planned, matches.len());
    assert_eq!(report.stats.changed(), 0);
}

#[test]
fn test_obsolete_declined_item_is_skipped() {
    let fx = Fixture::new("18.0.0");
    fx.project_file("markdown/迁移指南-v15.0.md", "old guide");
    fx.project_file(".claude/core-docs/ai/x.md", "old ai");
    let ctx = fx.ctx();
    let registry = RuleRegistry::with_defaults();
    let engine = ObsoleteFileEngine::new(&ctx, &registry);

    let matches = engine.detect(v("16.0.0"), v("18.0.0"));
    assert_eq!(matches.len(), 2);

    let prompt = ScriptedPrompt::new([Answer::No, Answer::Yes]);
    let report = engine
        .process(&matches, ObsoleteOptions::default(), &prompt)
        .unwrap();

    assert_eq!(report.items[0].outcome, ObsoleteOutcome::Skipped);
    assert_eq!(report.items[1].outcome, ObsoleteOutcome::Deleted);
    assert!(fx.exists("markdown/迁移指南-v15.0.md"));
    assert!(!fx.exists(".claude/core-docs/ai"));
    assert_eq!(prompt.asked().len(), 2);
}

#[test]
fn test_multi_rule_jump_applies_rules_in_target_order() {
    let fx = Fixture::new("21.0.0");
    fx.project_file("notes.md", "keep me");
    let ctx = fx.ctx();

    let mut registry = RuleRegistry::new();
    // Inserted out of order: the later delete must see the earlier backup.
    registry.add(ObsoleteRule::new(v("18.0.0"), v("21.0.0"), ObsoleteAction::Delete, "gone").file("notes.md"));
    registry.add(ObsoleteRule::new(v("14.0.0"), v("16.0.0"), ObsoleteAction::Backup, "moved").file("notes.md"));
    let engine = ObsoleteFileEngine::new(&ctx, &registry);

    let matches = engine.detect(v("14.0.0"), v("21.0.0"));
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].to_version, v("16.0.0"));

    let report = engine
        .process(&matches, ObsoleteOptions { auto_confirm: true, dry_run: false }, &AutoConfirm)
        .unwrap();

    assert_eq!(report.stats.backed, 1);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(report.stats.failed, 0);
    assert_eq!(fx.read(".backup-obsolete/notes.md").as_deref(), Some("keep me"));
}

#[test]
fn test_obsolete_migrate_moves_docs_into_override_dir() {
    let fx = Fixture::new("21.0.0");
    fx.project_file("markdown/开发规范.md", "custom rules");
    let ctx = fx.ctx();
    let registry = RuleRegistry::with_defaults();
    let engine = ObsoleteFileEngine::new(&ctx, &registry);

    let matches = engine.detect(v("15.0.0"), v("16.0.0"));
    let report = engine
        .process(&matches, ObsoleteOptions { auto_confirm: true, dry_run: false }, &AutoConfirm)
        .unwrap();

    assert_eq!(report.stats.migrated, 1);
    assert_eq!(fx.read("markdown/core/开发规范.md").as_deref(), Some("custom rules"));
}

#[test]
fn test_first_deploy_publishes_docs_and_records_manifest() {
    let fx = Fixture::new("21.0.0");
    let ctx = fx.ctx();

    let report = SyncService::new(&ctx)
        .deploy(
            DeployOptions {
                auto_confirm: true,
                ..Default::default()
            },
            &RuleRegistry::with_defaults(),
            &AutoConfirm,
        )
        .unwrap();

    assert_eq!(report.mode, DeployMode::FirstDeploy);
    assert!(report.obsolete.is_none());
    for doc in CORE_DOCS {
        assert!(fx.exists(&format!(".claude/core-docs/{doc}")), "{doc}");
    }
    assert!(fx.exists(".claude/core-docs/AI策略文档/strategy.md"));
    assert_eq!(
        fx.read(".claude/commands/mc.md").as_deref(),
        Some("# /mc for demo (21.0.0)\n")
    );
    assert!(fx.read("CLAUDE.md").unwrap().starts_with("# demo"));

    let manifest = fx.manifest();
    assert_eq!(manifest["version"], "21.0.0");
    assert_eq!(manifest["baselineHashes"].as_object().unwrap().len(), CORE_DOCS.len());
}

#[test]
fn test_second_deploy_is_up_to_date() {
    let fx = Fixture::new("21.0.0");
    let ctx = fx.ctx();
    let service = SyncService::new(&ctx);
    let options = DeployOptions {
        auto_confirm: true,
        ..Default::default()
    };
    service.deploy(options, &RuleRegistry::with_defaults(), &AutoConfirm).unwrap();
    let manifest_before = fx.read(".claude/workflow-manifest.json");

    let report = service.deploy(options, &RuleRegistry::with_defaults(), &AutoConfirm).unwrap();

    assert_eq!(report.mode, DeployMode::UpToDate);
    assert_eq!(fx.read(".claude/workflow-manifest.json"), manifest_before);
}

#[test]
fn test_deploy_keeps_existing_claude_md() {
    let fx = Fixture::new("21.0.0");
    fx.project_file("CLAUDE.md", "# mine\n");
    let ctx = fx.ctx();

    SyncService::new(&ctx)
        .deploy(DeployOptions::default(), &RuleRegistry::with_defaults(), &AutoConfirm)
        .unwrap();

    assert_eq!(fx.read("CLAUDE.md").as_deref(), Some("# mine\n"));
}

/// Memory filesystem that refuses to delete one path.
struct LockedFile {
    inner: MemoryFilesystem,
    locked: PathBuf,
}

impl Filesystem for LockedFile {
    fn read(&self, path: &Path) -> McflowResult<Vec<u8>> {
        self.inner.read(path)
    }
    fn write_file(&self, path: &Path, content: &str) -> McflowResult<()> {
        self.inner.write_file(path, content)
    }
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
    fn create_dir_all(&self, path: &Path) -> McflowResult<()> {
        self.inner.create_dir_all(path)
    }
    fn remove(&self, path: &Path) -> McflowResult<()> {
        if path == self.locked {
            return Err(ApplicationError::filesystem(path, "Permission denied").into());
        }
        self.inner.remove(path)
    }
    fn rename(&self, from: &Path, to: &Path) -> McflowResult<()> {
        self.inner.rename(from, to)
    }
    fn copy_file(&self, from: &Path, to: &Path) -> McflowResult<()> {
        self.inner.copy_file(from, to)
    }
    fn read_dir(&self, path: &Path) -> McflowResult<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
}

#[test]
fn test_deploy_reports_state_file_it_could_not_remove() {
    let fx = Fixture::new("21.0.0");
    fx.project_file(".claude/workflow-state.json", r#"{"task_id":"t1"}"#);
    let fs = LockedFile {
        inner: fx.fs.clone(),
        locked: PathBuf::from(proj(".claude/workflow-state.json")),
    };
    let ctx = WorkflowContext::new(Box::new(fs), Box::new(SimpleRenderer::new()), UPSTREAM, PROJECT);

    let report = SyncService::new(&ctx)
        .deploy(DeployOptions::default(), &RuleRegistry::with_defaults(), &AutoConfirm)
        .unwrap();

    assert_eq!(report.mode, DeployMode::FirstDeploy);
    assert!(!report.removed_state_file);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains(".claude/workflow-state.json"), "{:?}", report.warnings);
    assert!(fx.exists(".claude/workflow-state.json"));
    assert!(fx.exists(".claude/workflow-manifest.json"));
}

#[test]
fn test_deploy_into_upstream_is_refused() {
    let fs = MemoryFilesystem::new().with_file(format!("{UPSTREAM}/package.json"), "{}");
    let ctx = WorkflowContext::new(Box::new(fs), Box::new(SimpleRenderer::new()), UPSTREAM, UPSTREAM);

    let err = SyncService::new(&ctx)
        .deploy(DeployOptions::default(), &RuleRegistry::with_defaults(), &AutoConfirm)
        .unwrap_err();

    assert!(matches!(
        err,
        McflowError::Application(ApplicationError::DeployIntoUpstream { .. })
    ));
}

#[test]
fn test_missing_upstream_is_not_found() {
    let fs = MemoryFilesystem::new().with_file(proj(".keep"), "");
    let ctx = WorkflowContext::new(Box::new(fs), Box::new(SimpleRenderer::new()), "/nowhere", PROJECT);

    let err = SyncService::new(&ctx)
        .deploy(DeployOptions::default(), &RuleRegistry::with_defaults(), &AutoConfirm)
        .unwrap_err();

    assert!(matches!(
        err,
        McflowError::Application(ApplicationError::UpstreamNotFound { .. })
    ));
}

#[test]
fn test_upgrade_keeps_old_hash_for_unresolved_conflict() {
    let fx = Fixture::new("21.0.0");
    fx.install_manifest("20.0.0");
    let old = ContentHash::of(upstream_doc("开发规范.md", "v1").as_bytes());
    fx.upstream_file("markdown/开发规范.md", &upstream_doc("开发规范.md", "v2"));
    fx.upstream_file("markdown/问题排查.md", &upstream_doc("问题排查.md", "v2"));
    fx.project_file("markdown/core/开发规范.md", "my rules\n");
    let ctx = fx.ctx();

    let report = SyncService::new(&ctx)
        .deploy(
            DeployOptions {
                auto_confirm: true,
                ..Default::default()
            },
            &RuleRegistry::with_defaults(),
            &AutoConfirm,
        )
        .unwrap();

    assert_eq!(report.mode, DeployMode::Upgrade);
    assert_eq!(report.conflicts.len(), 1);
    let manifest = fx.manifest();
    assert_eq!(manifest["version"], "21.0.0");
    assert_eq!(manifest["baselineHashes"]["开发规范.md"], old.as_str());
    assert_eq!(
        manifest["baselineHashes"]["问题排查.md"],
        ContentHash::of(upstream_doc("问题排查.md", "v2").as_bytes()).as_str()
    );

    // The conflict is still there on the next check.
    let manifest = ManifestStore::new(&ctx).read();
    assert_eq!(OverrideConflictDetector::new(&ctx).detect(&manifest).unwrap().len(), 1);
}

#[test]
fn test_reset_acknowledges_every_baseline() {
    let fx = Fixture::new("21.0.0");
    fx.install_manifest("21.0.0");
    fx.upstream_file("markdown/开发规范.md", &upstream_doc("开发规范.md", "v2"));
    fx.project_file("markdown/core/开发规范.md", "my rules\n");
    let ctx = fx.ctx();

    let report = SyncService::new(&ctx)
        .deploy(
            DeployOptions {
                reset: true,
                auto_confirm: true,
                ..Default::default()
            },
            &RuleRegistry::with_defaults(),
            &AutoConfirm,
        )
        .unwrap();

    assert_eq!(report.mode, DeployMode::Reset);
    let manifest = ManifestStore::new(&ctx).read();
    assert!(OverrideConflictDetector::new(&ctx).detect(&manifest).unwrap().is_empty());
}

#[test]
fn test_accepting_upstream_backs_up_and_acknowledges() {
    let fx = Fixture::new("21.0.0");
    fx.install_manifest("21.0.0");
    fx.upstream_file("markdown/快速开始.md", "new upstream\n");
    fx.project_file("markdown/core/快速开始.md", "mine\n");
    let ctx = fx.ctx();
    let detector = OverrideConflictDetector::new(&ctx);

    let conflicts = detector.detect(&ManifestStore::new(&ctx).read()).unwrap();
    assert_eq!(conflicts.len(), 1);

    let outcome = detector.resolve(&conflicts[0], Resolution::AcceptUpstream).unwrap();

    assert_eq!(
        outcome,
        ResolutionOutcome::Accepted {
            backup: "markdown/core/快速开始.md.backup.2026-10-18".into()
        }
    );
    assert_eq!(fx.read("markdown/core/快速开始.md").as_deref(), Some("new upstream\n"));
    assert_eq!(fx.read("markdown/core/快速开始.md.backup.2026-10-18").as_deref(), Some("mine\n"));
    assert!(detector.detect(&ManifestStore::new(&ctx).read()).unwrap().is_empty());
}

#[test]
fn test_manual_merge_writes_merge_file_without_acknowledging() {
    let fx = Fixture::new("21.0.0");
    fx.install_manifest("21.0.0");
    fx.upstream_file("markdown/快速开始.md", "new upstream\n");
    fx.project_file("markdown/core/快速开始.md", "mine\n");
    let ctx = fx.ctx();
    let detector = OverrideConflictDetector::new(&ctx);
    let conflicts = detector.detect(&ManifestStore::new(&ctx).read()).unwrap();

    detector.resolve(&conflicts[0], Resolution::ManualMerge).unwrap();

    let merge = fx.read("markdown/core/快速开始.md.merge").unwrap();
    assert!(merge.contains("mine"));
    assert!(merge.contains("new upstream"));
    assert_eq!(detector.detect(&ManifestStore::new(&ctx).read()).unwrap().len(), 1);
}

#[test]
fn test_uninstall_backs_up_and_keeps_user_content() {
    let fx = Fixture::new("21.0.0");
    let ctx = fx.ctx();
    SyncService::new(&ctx)
        .deploy(DeployOptions::default(), &RuleRegistry::with_defaults(), &AutoConfirm)
        .unwrap();
    fx.project_file("tasks/t1/.task-meta.json", "{}");
    fx.project_file("markdown/systems/combat.md", "# combat");

    let report = UninstallService::new(&ctx)
        .execute(UninstallOptions::default())
        .unwrap();

    assert!(report.failed.is_empty());
    assert!(!fx.exists(".claude/workflow-manifest.json"));
    assert!(!fx.exists(".claude/core-docs"));
    assert!(!fx.exists(".claude/commands/mc.md"));
    assert!(fx.exists("CLAUDE.md"));
    assert!(fx.exists("tasks/t1/.task-meta.json"));
    assert!(fx.exists("markdown/systems/combat.md"));
    assert!(fx.exists(".backup-uninstall-2026-10-18/.claude/workflow-manifest.json"));
    assert!(report.plan.preserved.contains(&"tasks".to_string()));
}

#[test]
fn test_uninstall_dry_run_and_not_installed() {
    let fx = Fixture::new("21.0.0");
    let ctx = fx.ctx();
    let err = UninstallService::new(&ctx)
        .plan(UninstallOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        McflowError::Application(ApplicationError::NotInstalled { .. })
    ));

    SyncService::new(&ctx)
        .deploy(DeployOptions::default(), &RuleRegistry::with_defaults(), &AutoConfirm)
        .unwrap();
    let report = UninstallService::new(&ctx)
        .execute(UninstallOptions {
            dry_run: true,
            include_claude_md: true,
        })
        .unwrap();

    assert!(report.plan.targets.contains(&"CLAUDE.md".to_string()));
    assert!(report.removed.is_empty());
    assert!(fx.exists("CLAUDE.md"));
    assert!(fx.fs.exists(Path::new(&proj(".claude/workflow-manifest.json"))));
}
