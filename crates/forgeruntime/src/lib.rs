//! Workflow sandbox runtime
//!
//! This crate connects the pure graph engine to the outside world: the
//! simulation backends (local or remote), the editor session state, and the
//! validate-then-simulate run used by the editor's test action.

mod backend;
mod config;
mod error;
mod events;
mod runtime;
mod session;

pub use backend::{build_backend, FallbackBackend, LocalBackend, RemoteBackend, WorkflowBackend};
pub use config::{BackendMode, RuntimeConfig, ENV_BACKEND, ENV_REMOTE_URL, ENV_TIMEOUT_MS};
pub use error::BackendError;
pub use events::{EventBus, RunId, SandboxEvent};
pub use runtime::{ForgeRuntime, RunOutcome};
pub use session::EditorSession;
