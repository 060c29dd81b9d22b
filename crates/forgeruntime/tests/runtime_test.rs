// crates/forgeruntime/tests/runtime_test.rs

use async_trait::async_trait;
use forgecore::{
    AutomationAction, NodeKind, Position, SimulationRequest, SimulationResponse, StepStatus,
};
use forgeruntime::{
    BackendError, EditorSession, EventBus, FallbackBackend, ForgeRuntime, LocalBackend,
    RemoteBackend, RunOutcome, RuntimeConfig, SandboxEvent, WorkflowBackend,
};
use std::sync::Arc;
use std::time::Duration;

/// Backend that always fails, standing in for an unreachable service
struct BrokenBackend;

#[async_trait]
impl WorkflowBackend for BrokenBackend {
    fn name(&self) -> &str {
        "broken"
    }

    async fn simulate(
        &self,
        _request: &SimulationRequest,
    ) -> Result<SimulationResponse, BackendError> {
        Err(BackendError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }

    async fn automations(&self) -> Result<Vec<AutomationAction>, BackendError> {
        Err(BackendError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<SandboxEvent>) -> Vec<SandboxEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn unreachable_remote() -> RemoteBackend {
    RemoteBackend::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_run_starter_workflow() {
    let runtime = ForgeRuntime::new();
    let mut events = runtime.subscribe_events();
    let mut session = EditorSession::starter();

    let outcome = runtime.run(&mut session, false).await.unwrap();

    let RunOutcome::Completed(response) = outcome else {
        panic!("starter workflow should not be blocked");
    };
    assert_eq!(response.steps.len(), 3);
    assert!(response.steps.iter().all(|s| s.status == StepStatus::Ok));
    assert_eq!(
        session.log(),
        [
            "[ok] Start (start) Step 1: Executing start node",
            "[ok] Task (task) Step 2: Executing task node",
            "[ok] End (end) Step 3: Complete",
        ]
    );
    assert!(session.validation().is_empty());

    let events = drain(&mut events);
    assert!(matches!(events.first(), Some(SandboxEvent::RunStarted { nodes: 3, edges: 2, .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SandboxEvent::StepReported { .. }))
            .count(),
        3
    );
    assert!(matches!(
        events.last(),
        Some(SandboxEvent::RunCompleted { steps: 3, warnings: 0, .. })
    ));
}

#[tokio::test]
async fn test_run_blocked_by_validation() {
    let runtime = ForgeRuntime::new();
    let mut events = runtime.subscribe_events();
    let mut session = EditorSession::default();
    session.add_node(NodeKind::Start, Position::default());
    session.add_node(NodeKind::Task, Position::default());
    session.push_log("earlier line");

    let outcome = runtime.run(&mut session, false).await.unwrap();

    let RunOutcome::Blocked(issues) = outcome else {
        panic!("graph without end node must be blocked");
    };
    assert_eq!(issues.len(), 3);
    assert_eq!(session.validation(), issues.as_slice());
    assert_eq!(session.log(), ["earlier line", "Blocked: Add at least one end node"]);

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], SandboxEvent::RunBlocked { issues, .. } if issues.len() == 3));
}

#[tokio::test]
async fn test_blocked_run_keeps_previous_run_log() {
    let runtime = ForgeRuntime::new();
    let mut session = EditorSession::starter();
    runtime.run(&mut session, false).await.unwrap();
    let previous = session.log().to_vec();
    assert_eq!(previous.len(), 3);

    session.add_node(NodeKind::Task, Position::default());
    let outcome = runtime.run(&mut session, false).await.unwrap();

    assert!(outcome.is_blocked());
    let mut expected = previous;
    expected.push("Blocked: Node is isolated".to_string());
    assert_eq!(session.log(), expected.as_slice());

    // Fixing the graph and running again starts a fresh log
    let stray = session.workflow().nodes[3].id.clone();
    session.remove_node(&stray).unwrap();
    runtime.run(&mut session, false).await.unwrap();
    assert_eq!(session.log().len(), 3);
}

#[tokio::test]
async fn test_listener_drains_events_after_runtime_dropped() {
    let runtime = ForgeRuntime::new();
    let mut events = runtime.subscribe_events();
    let mut session = EditorSession::starter();

    let listener = tokio::spawn(async move {
        let mut received = Vec::new();
        while let Ok(event) = events.recv().await {
            received.push(event);
        }
        received
    });

    runtime.run(&mut session, false).await.unwrap();
    drop(runtime);

    let received = listener.await.unwrap();
    assert_eq!(received.len(), 5);
    assert!(matches!(received.last(), Some(SandboxEvent::RunCompleted { steps: 3, .. })));
}

#[test]
fn test_zero_capacity_event_bus() {
    let bus = EventBus::new(0);
    let mut receiver = bus.subscribe();

    bus.emit(SandboxEvent::BackendFallback {
        backend: "remote".to_string(),
        error: "offline".to_string(),
        timestamp: chrono::Utc::now(),
    });

    assert!(matches!(receiver.try_recv(), Ok(SandboxEvent::BackendFallback { .. })));
}

#[test]
fn test_event_wire_shape() {
    let event = SandboxEvent::RunCompleted {
        run_id: uuid::Uuid::nil(),
        steps: 3,
        warnings: 1,
        duration_ms: 12,
        timestamp: chrono::Utc::now(),
    };

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "RunCompleted");
    assert_eq!(json["steps"], 3);
    assert_eq!(json["warnings"], 1);

    let back: SandboxEvent = serde_json::from_value(json).unwrap();
    assert!(matches!(back, SandboxEvent::RunCompleted { steps: 3, warnings: 1, .. }));
}

#[tokio::test]
async fn test_forced_run_reports_missing_end() {
    let runtime = ForgeRuntime::new();
    let mut session = EditorSession::default();
    let start = session.add_node(NodeKind::Start, Position::default());
    let task = session.add_node(NodeKind::Task, Position::default());
    session.connect(&start, &task).unwrap();

    let outcome = runtime.run(&mut session, true).await.unwrap();

    let RunOutcome::Completed(response) = outcome else {
        panic!("forced run must not be blocked");
    };
    assert_eq!(response.steps.len(), 3);
    assert_eq!(response.steps[2].id, "warning");
    assert_eq!(response.steps[2].status, StepStatus::Warning);
    assert_eq!(session.log()[0], "Ignoring 1 validation issue(s)");
    assert_eq!(
        session.log().last().unwrap(),
        "[warning] Workflow does not reach an end node The workflow path does not connect to an end node"
    );
}

#[tokio::test]
async fn test_backend_error_is_logged_and_returned() {
    let runtime = ForgeRuntime::with_backend(Arc::new(BrokenBackend), &RuntimeConfig::default());
    let mut events = runtime.subscribe_events();
    let mut session = EditorSession::starter();

    let err = runtime.run(&mut session, false).await.unwrap_err();

    assert!(matches!(err, BackendError::Api { status: 503, .. }));
    assert_eq!(
        session.log(),
        ["Error: API error (status 503): service unavailable"]
    );
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, SandboxEvent::RunFailed { .. })));
}

#[tokio::test]
async fn test_fallback_matches_local_result() {
    let fallback = FallbackBackend::new(BrokenBackend);
    let request = EditorSession::starter().request();

    let remote = fallback.simulate(&request).await.unwrap();
    let local = LocalBackend::new().simulate(&request).await.unwrap();

    assert_eq!(remote, local);
    assert_eq!(fallback.automations().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_unreachable_remote_falls_back_with_event() {
    let runtime = ForgeRuntime::new();
    let fallback = FallbackBackend::new(unreachable_remote()).with_events(runtime.event_bus().clone());
    let mut events = runtime.subscribe_events();
    let request = EditorSession::starter().request();

    let response = fallback.simulate(&request).await.unwrap();

    assert_eq!(response.steps.len(), 3);
    assert!(matches!(
        drain(&mut events).as_slice(),
        [SandboxEvent::BackendFallback { backend, .. }] if backend == "remote"
    ));
}

#[tokio::test]
async fn test_unreachable_remote_without_fallback_fails() {
    let remote = unreachable_remote();

    let err = remote
        .simulate(&EditorSession::starter().request())
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Http(_)));
}

#[tokio::test]
async fn test_remote_config_builds_fallback_runtime() {
    let config = RuntimeConfig {
        request_timeout_ms: 500,
        ..RuntimeConfig::default()
    }
    .with_remote("http://127.0.0.1:1/");
    let runtime = ForgeRuntime::with_config(&config).unwrap();
    let mut session = EditorSession::starter();

    assert_eq!(runtime.backend().name(), "remote");
    let outcome = runtime.run(&mut session, false).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Completed(ref r) if r.steps.len() == 3));
}

#[tokio::test]
async fn test_invalid_remote_url() {
    let err = RemoteBackend::new("ftp://example.com", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, BackendError::InvalidUrl(_)));

    let config = RuntimeConfig::default().with_remote("localhost:3000");
    assert!(ForgeRuntime::with_config(&config).is_err());
}

#[tokio::test]
async fn test_load_automations() {
    let runtime = ForgeRuntime::new();
    let mut session = EditorSession::starter();

    runtime.load_automations(&mut session).await;
    assert_eq!(session.catalog().actions().len(), 3);
    assert!(session.catalog().find("generate_doc").is_some());

    let broken = ForgeRuntime::with_backend(Arc::new(BrokenBackend), &RuntimeConfig::default());
    let mut other = EditorSession::default();
    broken.load_automations(&mut other).await;
    assert_eq!(other.catalog().actions().len(), 3);
}
