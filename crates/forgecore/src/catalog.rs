use crate::node::{NodePayload, WorkflowNode};
use serde::{Deserialize, Serialize};

/// An automatable operation offered by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationAction {
    pub id: String,
    pub label: String,
    /// Parameter names the action requires, in display order
    #[serde(default)]
    pub params: Vec<String>,
}

impl AutomationAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, params: &[&str]) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Catalog of automation actions that automation nodes refer to by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutomationCatalog {
    actions: Vec<AutomationAction>,
}

impl AutomationCatalog {
    pub fn new(actions: Vec<AutomationAction>) -> Self {
        Self { actions }
    }

    /// Catalog served when no backend is available
    pub fn builtin() -> Self {
        Self::new(vec![
            AutomationAction::new("send_email", "Send Email", &["to", "subject"]),
            AutomationAction::new("generate_doc", "Generate Document", &["template", "recipient"]),
            AutomationAction::new("provision_account", "Provision Account", &["system", "role"]),
        ])
    }

    pub fn actions(&self) -> &[AutomationAction] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<AutomationAction> {
        self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&AutomationAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Parameter names an automation node may fill in, derived from its selected action.
    ///
    /// Empty for other node kinds, nodes with no action, or unknown action ids.
    pub fn params_for(&self, node: &WorkflowNode) -> &[String] {
        let NodePayload::Automation(automation) = &node.data.payload else {
            return &[];
        };
        automation
            .action_id
            .as_deref()
            .and_then(|id| self.find(id))
            .map(|action| action.params.as_slice())
            .unwrap_or(&[])
    }

    /// Required parameters of the node's action that have no value yet
    pub fn missing_params(&self, node: &WorkflowNode) -> Vec<String> {
        let NodePayload::Automation(automation) = &node.data.payload else {
            return Vec::new();
        };
        self.params_for(node)
            .iter()
            .filter(|name| {
                automation
                    .params
                    .get(name.as_str())
                    .map_or(true, |value| value.trim().is_empty())
            })
            .cloned()
            .collect()
    }
}

impl From<Vec<AutomationAction>> for AutomationCatalog {
    fn from(actions: Vec<AutomationAction>) -> Self {
        Self::new(actions)
    }
}
