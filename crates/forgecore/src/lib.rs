//! Workflow graph engine for the onboarding flow editor
//!
//! This crate holds the typed node/edge model and the pure functions the
//! editor calls into: validation, traversal and simulation projection.
//! Nothing here performs I/O or keeps state between calls.

mod analysis;
mod catalog;
mod error;
mod node;
pub mod simulation;
mod traversal;
pub mod validation;
mod workflow;

pub use analysis::{analyze, GraphAnalysis};
pub use catalog::{AutomationAction, AutomationCatalog};
pub use error::{ForgeError, WorkflowError};
pub use node::{
    ApprovalPayload, ApproverRole, AutomationPayload, EdgeId, EndPayload, KeyValue, NodeData,
    NodeId, NodeKind, NodePayload, Position, Priority, StartPayload, Subtask, TaskPayload,
    WorkflowEdge, WorkflowNode,
};
pub use simulation::{
    project, simulate, SimulationRequest, SimulationResponse, SimulationStep, StepStatus,
};
pub use traversal::{execution_path, traverse};
pub use validation::{validate, ValidationIssue};
pub use workflow::{short_id, Workflow};

/// Result type for forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;
