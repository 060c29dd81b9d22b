//! The simulation boundary.
//!
//! One trait, two interchangeable implementations: [`LocalBackend`] projects
//! in-process, [`RemoteBackend`] calls a simulation service over HTTP.
//! [`FallbackBackend`] wraps a remote so callers always get a result.

use crate::config::{BackendMode, RuntimeConfig};
use crate::error::BackendError;
use crate::events::{EventBus, SandboxEvent};
use async_trait::async_trait;
use chrono::Utc;
use forgecore::{
    simulate, AutomationAction, AutomationCatalog, SimulationRequest, SimulationResponse,
};
use std::sync::Arc;
use std::time::Duration;

/// Anything that can simulate workflows and list automation actions
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Short name used in logs, e.g. "local" or "remote"
    fn name(&self) -> &str;

    /// Simulate a run of the given `{nodes, edges}` snapshot
    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResponse, BackendError>;

    /// Automation actions automation nodes can refer to
    async fn automations(&self) -> Result<Vec<AutomationAction>, BackendError>;
}

/// In-process backend; never fails
#[derive(Debug, Clone)]
pub struct LocalBackend {
    catalog: AutomationCatalog,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::with_catalog(AutomationCatalog::builtin())
    }

    pub fn with_catalog(catalog: AutomationCatalog) -> Self {
        Self { catalog }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResponse, BackendError> {
        Ok(simulate(request))
    }

    async fn automations(&self) -> Result<Vec<AutomationAction>, BackendError> {
        Ok(self.catalog.actions().to_vec())
    }
}

/// HTTP client for a remote simulation service
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BackendError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl WorkflowBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResponse, BackendError> {
        tracing::debug!("POST {}", self.url("/simulate"));

        let response = self
            .client
            .post(self.url("/simulate"))
            .json(request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn automations(&self) -> Result<Vec<AutomationAction>, BackendError> {
        tracing::debug!("GET {}", self.url("/automations"));

        let response = self.client.get(self.url("/automations")).send().await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

/// Tries `primary` first and answers locally whenever it fails
pub struct FallbackBackend<B> {
    primary: B,
    local: LocalBackend,
    events: Option<Arc<EventBus>>,
}

impl<B: WorkflowBackend> FallbackBackend<B> {
    pub fn new(primary: B) -> Self {
        Self {
            primary,
            local: LocalBackend::new(),
            events: None,
        }
    }

    /// Report fallbacks on the given bus
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    fn fell_back(&self, error: &BackendError) {
        tracing::warn!(
            "{} backend unavailable, using local simulation: {}",
            self.primary.name(),
            error
        );
        if let Some(events) = &self.events {
            events.emit(SandboxEvent::BackendFallback {
                backend: self.primary.name().to_string(),
                error: error.to_string(),
                timestamp: Utc::now(),
            });
        }
    }
}

#[async_trait]
impl<B: WorkflowBackend> WorkflowBackend for FallbackBackend<B> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResponse, BackendError> {
        match self.primary.simulate(request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.fell_back(&e);
                self.local.simulate(request).await
            }
        }
    }

    async fn automations(&self) -> Result<Vec<AutomationAction>, BackendError> {
        match self.primary.automations().await {
            Ok(actions) => Ok(actions),
            Err(e) => {
                self.fell_back(&e);
                self.local.automations().await
            }
        }
    }
}

/// Build the backend selected by `config`
pub fn build_backend(
    config: &RuntimeConfig,
    events: Arc<EventBus>,
) -> Result<Arc<dyn WorkflowBackend>, BackendError> {
    match config.backend {
        BackendMode::Local => Ok(Arc::new(LocalBackend::new())),
        BackendMode::Remote => {
            let remote = RemoteBackend::new(
                config.remote_url.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )?;
            tracing::info!("Using remote simulation service at {}", remote.base_url());
            Ok(Arc::new(FallbackBackend::new(remote).with_events(events)))
        }
    }
}
