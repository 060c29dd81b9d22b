use crate::backend::{build_backend, LocalBackend, WorkflowBackend};
use crate::config::RuntimeConfig;
use crate::error::BackendError;
use crate::events::{EventBus, RunId, SandboxEvent};
use crate::session::EditorSession;
use chrono::Utc;
use forgecore::{AutomationCatalog, SimulationResponse, ValidationIssue};
use std::sync::Arc;
use std::time::Instant;

/// Result of a sandbox run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Validation found problems and the run was not attempted
    Blocked(Vec<ValidationIssue>),
    /// The backend simulated the workflow
    Completed(SimulationResponse),
}

impl RunOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, RunOutcome::Blocked(_))
    }
}

/// Validates and simulates workflows against the configured backend
pub struct ForgeRuntime {
    backend: Arc<dyn WorkflowBackend>,
    event_bus: Arc<EventBus>,
}

impl ForgeRuntime {
    /// Create a runtime that simulates locally
    pub fn new() -> Self {
        Self::with_backend(Arc::new(LocalBackend::new()), &RuntimeConfig::default())
    }

    /// Create a runtime with the backend selected by `config`
    pub fn with_config(config: &RuntimeConfig) -> Result<Self, BackendError> {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        let backend = build_backend(config, event_bus.clone())?;
        Ok(Self { backend, event_bus })
    }

    /// Create a runtime around an already built backend
    pub fn with_backend(backend: Arc<dyn WorkflowBackend>, config: &RuntimeConfig) -> Self {
        Self {
            backend,
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
        }
    }

    pub fn backend(&self) -> &Arc<dyn WorkflowBackend> {
        &self.backend
    }

    /// Subscribe to sandbox events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<SandboxEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Load the automation catalog into the session.
    ///
    /// Falls back to the built-in catalog if the backend cannot provide one.
    pub async fn load_automations(&self, session: &mut EditorSession) {
        let actions = match self.backend.automations().await {
            Ok(actions) => actions,
            Err(e) => {
                tracing::warn!("Could not load automations, using built-in list: {}", e);
                AutomationCatalog::builtin().into_actions()
            }
        };
        tracing::debug!("Loaded {} automation actions", actions.len());
        session.set_automations(actions);
    }

    /// Test the session's workflow.
    ///
    /// Validation runs first and blocks the run unless `force` is set. A
    /// blocked run appends to the existing log; otherwise the log is reset
    /// and then receives one line per simulation step.
    pub async fn run(
        &self,
        session: &mut EditorSession,
        force: bool,
    ) -> Result<RunOutcome, BackendError> {
        let run_id = RunId::new_v4();
        let start_time = Instant::now();

        let issues = session.validate().to_vec();

        if !issues.is_empty() && !force {
            tracing::info!("Run {} blocked: {}", run_id, issues[0].message);
            session.push_log(format!("Blocked: {}", issues[0].message));
            self.event_bus.emit(SandboxEvent::RunBlocked {
                run_id,
                issues: issues.clone(),
                timestamp: Utc::now(),
            });
            return Ok(RunOutcome::Blocked(issues));
        }

        session.reset_log();
        if !issues.is_empty() {
            tracing::warn!("Run {} forced past {} validation issue(s)", run_id, issues.len());
            session.push_log(format!("Ignoring {} validation issue(s)", issues.len()));
        }

        let request = session.request();
        self.event_bus.emit(SandboxEvent::RunStarted {
            run_id,
            nodes: request.nodes.len(),
            edges: request.edges.len(),
            timestamp: Utc::now(),
        });
        tracing::info!("Starting run {} on {} backend", run_id, self.backend.name());

        let response = match self.backend.simulate(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Run {} failed: {}", run_id, e);
                session.push_log(format!("Error: {}", e));
                self.event_bus.emit(SandboxEvent::RunFailed {
                    run_id,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        for step in &response.steps {
            session.push_log(step.log_line());
            self.event_bus.emit(SandboxEvent::StepReported {
                run_id,
                step: step.clone(),
                timestamp: Utc::now(),
            });
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        self.event_bus.emit(SandboxEvent::RunCompleted {
            run_id,
            steps: response.steps.len(),
            warnings: response.warnings().count(),
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!("Run {} completed in {}ms", run_id, duration_ms);

        Ok(RunOutcome::Completed(response))
    }
}

impl Default for ForgeRuntime {
    fn default() -> Self {
        Self::new()
    }
}
