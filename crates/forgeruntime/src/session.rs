//! Mutable editor state handed to the pure graph functions.

use forgecore::{
    analyze, traverse, validate, AutomationAction, AutomationCatalog, EdgeId, ForgeError,
    GraphAnalysis, NodeData, NodeId, NodeKind, Position, SimulationRequest, ValidationIssue,
    Workflow, WorkflowError, WorkflowNode,
};

/// Everything the editor surface owns: the graph, the selection, the
/// automation catalog, the last validation result and the sandbox log
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    workflow: Workflow,
    selected: Option<NodeId>,
    catalog: AutomationCatalog,
    validation: Vec<ValidationIssue>,
    log: Vec<String>,
}

impl EditorSession {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            ..Self::default()
        }
    }

    /// Session opened on the default Start -> Task -> End graph
    pub fn starter() -> Self {
        Self::new(Workflow::starter())
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        self.workflow.add_node(kind, position)
    }

    pub fn update_node<F>(&mut self, id: &str, edit: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(&mut NodeData),
    {
        self.workflow.update_node(id, edit)
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), WorkflowError> {
        self.workflow.move_node(id, position)
    }

    pub fn connect(&mut self, source: &str, target: &str) -> Result<EdgeId, WorkflowError> {
        self.workflow.connect(source, target)
    }

    /// Delete a node and its edges, clearing the selection if it pointed there
    pub fn remove_node(&mut self, id: &str) -> Result<WorkflowNode, WorkflowError> {
        let removed = self.workflow.remove_node(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(removed)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<(), WorkflowError> {
        self.workflow.remove_edge(id).map(|_| ())
    }

    /// Select a node, or clear the selection with `None`
    pub fn select(&mut self, id: Option<&str>) -> Result<(), WorkflowError> {
        match id {
            Some(id) if self.workflow.find_node(id).is_none() => {
                Err(WorkflowError::NodeNotFound(id.to_string()))
            }
            Some(id) => {
                self.selected = Some(id.to_string());
                Ok(())
            }
            None => {
                self.selected = None;
                Ok(())
            }
        }
    }

    pub fn selected_node(&self) -> Option<&WorkflowNode> {
        self.selected
            .as_deref()
            .and_then(|id| self.workflow.find_node(id))
    }

    pub fn set_automations(&mut self, actions: Vec<AutomationAction>) {
        self.catalog = AutomationCatalog::new(actions);
    }

    pub fn catalog(&self) -> &AutomationCatalog {
        &self.catalog
    }

    /// Parameter names the form should offer for an automation node
    pub fn automation_params(&self, id: &str) -> Vec<String> {
        self.workflow
            .find_node(id)
            .map(|node| self.catalog.params_for(node).to_vec())
            .unwrap_or_default()
    }

    /// Re-run validation on the current graph and remember the result
    pub fn validate(&mut self) -> &[ValidationIssue] {
        self.validation = validate(&self.workflow.nodes, &self.workflow.edges);
        &self.validation
    }

    /// Issues from the most recent [`EditorSession::validate`]
    pub fn validation(&self) -> &[ValidationIssue] {
        &self.validation
    }

    /// Nodes in execution order, for the preview list
    pub fn preview(&self) -> Vec<&WorkflowNode> {
        traverse(&self.workflow.nodes, &self.workflow.edges)
    }

    pub fn analysis(&self) -> GraphAnalysis {
        analyze(&self.workflow.nodes, &self.workflow.edges)
    }

    /// Snapshot of the graph to send to a simulation backend
    pub fn request(&self) -> SimulationRequest {
        self.workflow.clone()
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn reset_log(&mut self) {
        self.log.clear();
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn export_json(&self) -> Result<String, ForgeError> {
        self.workflow.to_json_pretty()
    }

    /// Replace the graph with an imported one; selection and validation reset
    pub fn import_json(&mut self, json: &str) -> Result<(), ForgeError> {
        self.workflow = Workflow::from_json(json)?;
        self.selected = None;
        self.validation.clear();
        Ok(())
    }
}
