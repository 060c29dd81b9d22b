use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type NodeId = String;
pub type EdgeId = String;

/// The five node kinds a workflow can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Task,
    Approval,
    Automation,
    End,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Start,
        NodeKind::Task,
        NodeKind::Approval,
        NodeKind::Automation,
        NodeKind::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Task => "task",
            NodeKind::Approval => "approval",
            NodeKind::Automation => "automation",
            NodeKind::End => "end",
        }
    }

    /// Title given to freshly created nodes of this kind
    pub fn default_title(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Task => "Task",
            NodeKind::Approval => "Approval",
            NodeKind::Automation => "Automation",
            NodeKind::End => "End",
        }
    }

    /// Short palette hint shown next to the kind
    pub fn hint(&self) -> &'static str {
        match self {
            NodeKind::Start => "Entry point",
            NodeKind::Task => "Human task",
            NodeKind::Approval => "Manager/HR check",
            NodeKind::Automation => "System action",
            NodeKind::End => "Completion",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Roles allowed to sign off an approval step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApproverRole {
    #[default]
    Manager,
    #[serde(rename = "HRBP")]
    Hrbp,
    Director,
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproverRole::Manager => f.write_str("Manager"),
            ApproverRole::Hrbp => f.write_str("HRBP"),
            ApproverRole::Director => f.write_str("Director"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartPayload {
    #[serde(default)]
    pub metadata: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub custom_fields: Vec<KeyValue>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalPayload {
    #[serde(default)]
    pub role: ApproverRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub summary: bool,
}

/// Kind-specific configuration of a node, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodePayload {
    Start(StartPayload),
    Task(TaskPayload),
    Approval(ApprovalPayload),
    Automation(AutomationPayload),
    End(EndPayload),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Start(_) => NodeKind::Start,
            NodePayload::Task(_) => NodeKind::Task,
            NodePayload::Approval(_) => NodeKind::Approval,
            NodePayload::Automation(_) => NodeKind::Automation,
            NodePayload::End(_) => NodeKind::End,
        }
    }

    /// Payload a freshly added node of `kind` starts with
    pub fn defaults_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodePayload::Start(StartPayload::default()),
            NodeKind::Task => NodePayload::Task(TaskPayload::default()),
            NodeKind::Approval => NodePayload::Approval(ApprovalPayload {
                role: ApproverRole::Manager,
                threshold: Some(1.0),
                priority: None,
            }),
            NodeKind::Automation => NodePayload::Automation(AutomationPayload::default()),
            NodeKind::End => NodePayload::End(EndPayload {
                message: Some("Complete".to_string()),
                summary: false,
            }),
        }
    }
}

/// Data carried by a node: its title plus the kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub title: String,
    #[serde(flatten)]
    pub payload: NodePayload,
}

/// Node position in visual editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node on the workflow canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, payload: NodePayload) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            data: NodeData {
                title: title.into(),
                payload,
            },
        }
    }

    /// Node of `kind` with the editor's default title and payload
    pub fn with_defaults(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self::new(id, kind.default_title(), NodePayload::defaults_for(kind))
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.data.payload.kind()
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    /// Display label, e.g. `"Collect documents (task)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.data.title, self.kind())
    }
}

/// Directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl WorkflowEdge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}
