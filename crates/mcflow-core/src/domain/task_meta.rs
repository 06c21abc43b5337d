//! Task metadata (`tasks/**/.task-meta.json`) in the 21.0 architecture.
//!
//! Task metadata is free-form JSON owned by the workflow hooks, so it is kept
//! as a [`serde_json::Value`] and only the fields below are touched.

use serde_json::{Map, Value, json};

use super::error::DomainError;

pub const ARCHITECTURE_VERSION: &str = "21.0";

const LEGACY_FIELDS: [&str; 3] = ["workflow_state", "workflow_state_ref", "archived_snapshot"];
const MERGED_FIELDS: [&str; 4] = ["current_step", "steps", "metrics", "bug_fix_tracking"];

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// Does this metadata predate the 21.0 layout?
pub fn needs_migration(meta: &Value) -> bool {
    is_truthy(meta.get("workflow_state"))
        || is_truthy(meta.get("archived_snapshot"))
        || !is_truthy(meta.get("architecture_version"))
}

pub fn is_current(meta: &Value) -> bool {
    meta.get("architecture_version").and_then(Value::as_str) == Some(ARCHITECTURE_VERSION)
}

/// Task id of the active task recorded in `.claude/workflow-state.json`.
pub fn active_task_id(state: &Value) -> Option<&str> {
    state
        .get("task_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Rewrite one task's metadata to the 21.0 layout.
///
/// Fields from `state` (the old active-task state file) win over the ones
/// already in `meta`. Legacy fields are dropped and missing required fields
/// get their defaults.
pub fn migrate_task_meta(meta: Value, state: Option<&Value>) -> Result<Value, DomainError> {
    let Value::Object(mut migrated) = meta else {
        return Err(DomainError::TaskMetaNotObject);
    };

    migrated.insert(
        "architecture_version".into(),
        Value::String(ARCHITECTURE_VERSION.into()),
    );

    if let Some(state) = state {
        for field in MERGED_FIELDS {
            if let Some(value) = state.get(field).filter(|v| is_truthy(Some(*v))) {
                migrated.insert(field.into(), value.clone());
            }
        }
    }

    for field in LEGACY_FIELDS {
        migrated.remove(field);
    }

    fill_default(&mut migrated, "steps", || {
        json!({
            "step0_context": { "status": "pending" },
            "step1_understand": { "status": "pending" },
            "step3_execute": { "status": "pending" },
            "step4_cleanup": { "status": "pending" }
        })
    });
    fill_default(&mut migrated, "metrics", || {
        json!({ "docs_read": [], "code_changes": [], "tool_calls": [] })
    });
    fill_default(&mut migrated, "current_step", || json!("step0_context"));

    Ok(Value::Object(migrated))
}

fn fill_default(map: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    if !is_truthy(map.get(key)) {
        map.insert(key.into(), default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_meta_needs_migration() {
        assert!(needs_migration(&json!({ "task_id": "t1" })));
        assert!(needs_migration(&json!({ "architecture_version": "20.3", "workflow_state": {} })));
        assert!(needs_migration(&json!({ "architecture_version": "21.0", "archived_snapshot": [1] })));
        assert!(!needs_migration(&json!({ "architecture_version": "21.0" })));
    }

    #[test]
    fn migration_drops_legacy_fields_and_fills_defaults() {
        let meta = json!({
            "task_id": "t1",
            "workflow_state": { "x": 1 },
            "workflow_state_ref": "../state.json",
            "archived_snapshot": {}
        });
        let migrated = migrate_task_meta(meta, None).unwrap();

        assert_eq!(migrated["architecture_version"], "21.0");
        assert_eq!(migrated["task_id"], "t1");
        assert!(migrated.get("workflow_state").is_none());
        assert!(migrated.get("workflow_state_ref").is_none());
        assert!(migrated.get("archived_snapshot").is_none());
        assert_eq!(migrated["steps"]["step3_execute"]["status"], "pending");
        assert_eq!(migrated["metrics"]["tool_calls"], json!([]));
        assert_eq!(migrated["current_step"], "step0_context");
        assert!(!needs_migration(&migrated));
    }

    #[test]
    fn active_state_wins_over_meta() {
        let meta = json!({ "current_step": "step0_context", "steps": { "a": 1 } });
        let state = json!({
            "task_id": "t1",
            "current_step": "step3_execute",
            "bug_fix_tracking": { "attempts": 2 }
        });
        let migrated = migrate_task_meta(meta, Some(&state)).unwrap();

        assert_eq!(migrated["current_step"], "step3_execute");
        assert_eq!(migrated["steps"], json!({ "a": 1 }));
        assert_eq!(migrated["bug_fix_tracking"]["attempts"], 2);
        assert_eq!(active_task_id(&state), Some("t1"));
    }

    #[test]
    fn migrating_twice_changes_nothing() {
        let once = migrate_task_meta(json!({ "task_id": "t" }), None).unwrap();
        let twice = migrate_task_meta(once.clone(), None).unwrap();
        assert_eq!(once, twice);
        assert!(is_current(&twice));
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            migrate_task_meta(json!([1, 2]), None),
            Err(DomainError::TaskMetaNotObject)
        );
    }
}
