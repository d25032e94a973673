// ABOUTME: Error types for tree operations and layout (de)serialization.
// ABOUTME: Every failed operation leaves the tree exactly as it was before the call.

use msplit_core::{NodeId, PaneId};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Pane not found: {0}")]
    PaneNotFound(PaneId),

    #[error("Split node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Layout is empty")]
    EmptyTree,

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No transaction in progress")]
    NoTransaction,

    #[error("Cannot {0} while a transaction is in progress")]
    TransactionInProgress(&'static str),

    #[error("Transaction '{0}' rolled back")]
    TransactionRolledBack(String),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout document has no version field")]
    MissingVersion,

    #[error("Invalid layout version {version:?}: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Unsupported layout version {found} (supported major version {supported})")]
    IncompatibleVersion { found: String, supported: u64 },

    #[error("Invalid layout tree: {}", .0.join("; "))]
    InvalidTree(Vec<String>),

    #[error("Could not determine state directory")]
    NoStatePath,
}
