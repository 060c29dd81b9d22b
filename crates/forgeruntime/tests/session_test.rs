// crates/forgeruntime/tests/session_test.rs

use forgecore::{AutomationCatalog, NodeKind, NodePayload, Position, WorkflowError};
use forgeruntime::{BackendMode, EditorSession, RuntimeConfig};
use std::collections::HashMap;

#[test]
fn test_select_and_remove_clears_selection() {
    let mut session = EditorSession::starter();
    let task = session.workflow().nodes[1].id.clone();

    session.select(Some(&task)).unwrap();
    assert_eq!(session.selected_node().unwrap().id, task);

    session.remove_node(&task).unwrap();
    assert!(session.selected_node().is_none());
    assert!(session.workflow().edges.is_empty());
}

#[test]
fn test_select_unknown_node() {
    let mut session = EditorSession::starter();

    assert_eq!(
        session.select(Some("nope")).unwrap_err(),
        WorkflowError::NodeNotFound("nope".to_string())
    );
    session.select(None).unwrap();
    assert!(session.selected_node().is_none());
}

#[test]
fn test_automation_params_follow_selected_action() {
    let mut session = EditorSession::starter();
    session.set_automations(AutomationCatalog::builtin().into_actions());
    let auto = session.add_node(NodeKind::Automation, Position::new(300.0, 220.0));

    assert!(session.automation_params(&auto).is_empty());

    session
        .update_node(&auto, |data| {
            if let NodePayload::Automation(payload) = &mut data.payload {
                payload.action_id = Some("send_email".to_string());
            }
        })
        .unwrap();

    assert_eq!(session.automation_params(&auto), vec!["to", "subject"]);
    assert!(session.automation_params("missing").is_empty());
}

#[test]
fn test_validate_is_recomputed_on_demand() {
    let mut session = EditorSession::starter();
    assert!(session.validate().is_empty());

    let lonely = session.add_node(NodeKind::Approval, Position::default());
    assert!(session.validation().is_empty(), "stored result is not refreshed implicitly");

    let issues = session.validate().to_vec();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].node_id.as_deref(), Some(lonely.as_str()));
}

#[test]
fn test_preview_follows_edges() {
    let mut session = EditorSession::starter();
    let end = session.workflow().nodes[2].id.clone();
    let task = session.workflow().nodes[1].id.clone();
    let approval = session.add_node(NodeKind::Approval, Position::default());
    session.connect(&task, &approval).unwrap();
    session.connect(&approval, &end).unwrap();

    let order: Vec<_> = session.preview().iter().map(|n| n.kind()).collect();

    assert_eq!(
        order,
        vec![NodeKind::Start, NodeKind::Task, NodeKind::End, NodeKind::Approval]
    );
    assert!(session.analysis().unreachable.is_empty());
}

#[test]
fn test_export_import_roundtrip() {
    let mut session = EditorSession::starter();
    let task = session.workflow().nodes[1].id.clone();
    session.select(Some(&task)).unwrap();
    session.validate();

    let json = session.export_json().unwrap();
    let mut other = EditorSession::default();
    other.import_json(&json).unwrap();

    assert_eq!(other.workflow(), session.workflow());
    assert!(other.import_json("{ not json").is_err());
    assert_eq!(other.workflow(), session.workflow(), "failed import keeps the graph");

    session.import_json(&json).unwrap();
    assert!(session.selected_node().is_none());
}

#[test]
fn test_config_from_lookup() {
    let mut vars = HashMap::new();
    vars.insert("FORGE_BACKEND", "Remote");
    vars.insert("FORGE_REMOTE_URL", "http://sim.internal:8080");
    vars.insert("FORGE_TIMEOUT_MS", "250");

    let config = RuntimeConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(config.backend, BackendMode::Remote);
    assert_eq!(config.remote_url, "http://sim.internal:8080");
    assert_eq!(config.request_timeout_ms, 250);
}

#[test]
fn test_config_ignores_bad_values() {
    let config = RuntimeConfig::from_lookup(|key| match key {
        "FORGE_BACKEND" => Some("carrier-pigeon".to_string()),
        "FORGE_TIMEOUT_MS" => Some("soon".to_string()),
        _ => None,
    });

    let defaults = RuntimeConfig::default();
    assert_eq!(config.backend, defaults.backend);
    assert_eq!(config.request_timeout_ms, defaults.request_timeout_ms);
    assert_eq!(config.remote_url, defaults.remote_url);
}
