//! Projection of the execution order into human-readable simulation steps.
//!
//! A remote simulation service must return exactly what [`project`] returns
//! for the same request so the two are interchangeable for the editor.

use crate::node::{NodeKind, NodePayload, WorkflowEdge, WorkflowNode};
use crate::traversal::traverse;
use crate::Workflow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a simulation call: the current `{nodes, edges}` snapshot
pub type SimulationRequest = Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Warning,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Ok => f.write_str("ok"),
            StepStatus::Warning => f.write_str("warning"),
        }
    }
}

/// One reported unit of a simulated run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    pub id: String,
    pub label: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SimulationStep {
    pub fn is_warning(&self) -> bool {
        self.status == StepStatus::Warning
    }

    /// Line as shown in the sandbox log, e.g. `[ok] Start (start) Step 1: Executing start node`
    pub fn log_line(&self) -> String {
        let line = format!(
            "[{}] {} {}",
            self.status,
            self.label,
            self.detail.as_deref().unwrap_or("")
        );
        line.trim_end().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub steps: Vec<SimulationStep>,
}

impl SimulationResponse {
    pub fn warnings(&self) -> impl Iterator<Item = &SimulationStep> {
        self.steps.iter().filter(|s| s.is_warning())
    }
}

pub const EMPTY_STEP_ID: &str = "none";
pub const EMPTY_STEP_LABEL: &str = "Empty workflow";
pub const NO_END_STEP_ID: &str = "warning";
pub const NO_END_STEP_LABEL: &str = "Workflow does not reach an end node";
pub const NO_END_STEP_DETAIL: &str = "The workflow path does not connect to an end node";

/// Project a simulated run of the workflow.
///
/// Each node in execution order becomes an `ok` step. An empty order yields a
/// single warning step; an order without an end node gets a trailing warning.
pub fn project(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Vec<SimulationStep> {
    let order = traverse(nodes, edges);

    if order.is_empty() {
        return vec![SimulationStep {
            id: EMPTY_STEP_ID.to_string(),
            label: EMPTY_STEP_LABEL.to_string(),
            status: StepStatus::Warning,
            detail: None,
        }];
    }

    let mut steps: Vec<SimulationStep> = order
        .iter()
        .enumerate()
        .map(|(index, node)| SimulationStep {
            id: node.id.clone(),
            label: node.label(),
            status: StepStatus::Ok,
            detail: Some(format!("Step {}: {}", index + 1, describe(node))),
        })
        .collect();

    if !order.iter().any(|n| n.kind() == NodeKind::End) {
        steps.push(SimulationStep {
            id: NO_END_STEP_ID.to_string(),
            label: NO_END_STEP_LABEL.to_string(),
            status: StepStatus::Warning,
            detail: Some(NO_END_STEP_DETAIL.to_string()),
        });
    }

    steps
}

/// [`project`] over a whole request, wrapped as the wire response
pub fn simulate(request: &SimulationRequest) -> SimulationResponse {
    SimulationResponse {
        steps: project(&request.nodes, &request.edges),
    }
}

fn describe(node: &WorkflowNode) -> String {
    let specific = match &node.data.payload {
        NodePayload::Task(task) => present(&task.assignee).map(|a| format!("Assigned to: {a}")),
        NodePayload::Approval(approval) => {
            Some(format!("Requires approval from: {}", approval.role))
        }
        NodePayload::Automation(automation) => {
            present(&automation.action_id).map(|a| format!("Running automation: {a}"))
        }
        NodePayload::End(end) => present(&end.message).map(str::to_string),
        NodePayload::Start(_) => None,
    };

    specific.unwrap_or_else(|| format!("Executing {} node", node.kind()))
}

/// Blank strings count as unset, as the editor leaves cleared inputs empty
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
