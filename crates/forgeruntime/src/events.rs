use chrono::{DateTime, Utc};
use forgecore::{SimulationStep, ValidationIssue};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Events emitted while the sandbox tests a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SandboxEvent {
    RunStarted {
        run_id: RunId,
        nodes: usize,
        edges: usize,
        timestamp: DateTime<Utc>,
    },
    RunBlocked {
        run_id: RunId,
        issues: Vec<ValidationIssue>,
        timestamp: DateTime<Utc>,
    },
    StepReported {
        run_id: RunId,
        step: SimulationStep,
        timestamp: DateTime<Utc>,
    },
    BackendFallback {
        backend: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
    RunCompleted {
        run_id: RunId,
        steps: usize,
        warnings: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    RunFailed {
        run_id: RunId,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for sandbox events
pub struct EventBus {
    sender: broadcast::Sender<SandboxEvent>,
}

impl EventBus {
    /// A zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SandboxEvent> {
        self.sender.subscribe()
    }

    /// Send to current subscribers; dropped silently when nobody listens
    pub fn emit(&self, event: SandboxEvent) {
        let _ = self.sender.send(event);
    }
}
