use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by explicit editing operations on a [`crate::Workflow`].
///
/// The analysis functions never produce these; malformed graphs are
/// reported as data by `validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
}
