use crate::node::{EdgeId, NodeData, NodeId, NodeKind, Position, WorkflowEdge, WorkflowNode};
use crate::{ForgeError, WorkflowError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Complete workflow graph as the editor holds and exports it.
///
/// This is also the body of a simulation request: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph a new editor session opens with: Start -> Task -> End
    pub fn starter() -> Self {
        let mut workflow = Self::new();
        let start = workflow.add_node(NodeKind::Start, Position::new(150.0, 80.0));
        let task = workflow.add_node(NodeKind::Task, Position::new(150.0, 220.0));
        let end = workflow.add_node(NodeKind::End, Position::new(150.0, 380.0));

        workflow
            .edges
            .push(WorkflowEdge::new("e-start-task", start, task.clone()));
        workflow
            .edges
            .push(WorkflowEdge::new("e-task-end", task, end));
        workflow
    }

    /// Add a node of `kind` with default configuration, returning its generated id
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let id = short_id();
        let mut node = WorkflowNode::with_defaults(id.clone(), kind);
        node.position = position;
        self.nodes.push(node);
        id
    }

    /// Insert a fully built node, rejecting duplicate ids
    pub fn insert_node(&mut self, node: WorkflowNode) -> Result<NodeId, WorkflowError> {
        if self.find_node(&node.id).is_some() {
            return Err(WorkflowError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.nodes.push(node);
        Ok(id)
    }

    /// Connect two existing nodes. Parallel edges and self-loops are allowed.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<EdgeId, WorkflowError> {
        for endpoint in [source, target] {
            if self.find_node(endpoint).is_none() {
                return Err(WorkflowError::NodeNotFound(endpoint.to_string()));
            }
        }

        let id = format!("e-{}", short_id());
        self.edges.push(WorkflowEdge::new(id.clone(), source, target));
        Ok(id)
    }

    /// Remove a node together with every edge touching it
    pub fn remove_node(&mut self, id: &str) -> Result<WorkflowNode, WorkflowError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| WorkflowError::NodeNotFound(id.to_string()))?;

        self.edges.retain(|e| e.source != id && e.target != id);
        Ok(self.nodes.remove(index))
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<WorkflowEdge, WorkflowError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| WorkflowError::EdgeNotFound(id.to_string()))?;
        Ok(self.edges.remove(index))
    }

    /// Apply an in-place edit to a node's data
    pub fn update_node<F>(&mut self, id: &str, edit: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(&mut NodeData),
    {
        let node = self
            .find_node_mut(id)
            .ok_or_else(|| WorkflowError::NodeNotFound(id.to_string()))?;
        edit(&mut node.data);
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), WorkflowError> {
        let node = self
            .find_node_mut(id)
            .ok_or_else(|| WorkflowError::NodeNotFound(id.to_string()))?;
        node.position = position;
        Ok(())
    }

    pub fn find_node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn find_edge(&self, id: &str) -> Option<&WorkflowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn to_json_pretty(&self) -> Result<String, ForgeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ForgeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Short random identifier for editor-created nodes and edges
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
