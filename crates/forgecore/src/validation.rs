//! Structural checks over a workflow graph.
//!
//! Every rule runs against the same snapshot and all findings are collected;
//! callers treat the first issue as the blocking reason.

use crate::node::{NodeKind, WorkflowEdge, WorkflowNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const MSG_START_COUNT: &str = "Workflow must have exactly one start node";
pub const MSG_MISSING_END: &str = "Add at least one end node";
pub const MSG_ISOLATED: &str = "Node is isolated";
pub const MSG_START_INCOMING: &str = "Start node cannot have incoming edges";
pub const MSG_END_OUTGOING: &str = "End node should not have outgoing edges";
pub const MSG_DANGLING_EDGE: &str = "Edge references missing node";

/// A structural problem found in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
}

impl ValidationIssue {
    /// Issue about the graph as a whole
    pub fn graph(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node_id: None,
            edge_id: None,
        }
    }

    pub fn node(message: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node_id: Some(node_id.into()),
            edge_id: None,
        }
    }

    pub fn edge(message: impl Into<String>, edge_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node_id: None,
            edge_id: Some(edge_id.into()),
        }
    }
}

/// Validate a workflow graph.
///
/// Never fails: malformed input yields issues instead. Issues are ordered as
/// graph-level checks first, then per-node checks in node order, then
/// dangling edges in edge order.
pub fn validate(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let start_count = nodes.iter().filter(|n| n.kind() == NodeKind::Start).count();
    if start_count != 1 {
        issues.push(ValidationIssue::graph(MSG_START_COUNT));
    }

    if !nodes.iter().any(|n| n.kind() == NodeKind::End) {
        issues.push(ValidationIssue::graph(MSG_MISSING_END));
    }

    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        *out_degree.entry(edge.source.as_str()).or_default() += 1;
        *in_degree.entry(edge.target.as_str()).or_default() += 1;
    }

    for node in nodes {
        let id = node.id.as_str();
        let has_out = out_degree.contains_key(id);
        let has_in = in_degree.contains_key(id);

        if !has_out && !has_in {
            issues.push(ValidationIssue::node(MSG_ISOLATED, id));
        }

        match node.kind() {
            NodeKind::Start if has_in => {
                issues.push(ValidationIssue::node(MSG_START_INCOMING, id));
            }
            NodeKind::End if has_out => {
                issues.push(ValidationIssue::node(MSG_END_OUTGOING, id));
            }
            NodeKind::Start
            | NodeKind::Task
            | NodeKind::Approval
            | NodeKind::Automation
            | NodeKind::End => {}
        }
    }

    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in edges {
        if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
            issues.push(ValidationIssue::edge(MSG_DANGLING_EDGE, edge.id.as_str()));
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        issues = issues.len(),
        "validated workflow"
    );

    issues
}
