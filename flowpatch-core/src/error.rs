//! Operation errors raised while editing a workflow graph.

use thiserror::Error;

/// Errors raised by individual graph edit operations.
///
/// The batch processor catches these per-operation and reports them as
/// structured data; the mutation engine lets them propagate as hard
/// failures (they are never retried).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// A node with this id already exists in the workflow
    #[error("node '{0}' already exists")]
    DuplicateNodeId(String),

    /// No node with this id exists in the workflow
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    /// No node with this name exists (connections are keyed by name)
    #[error("node named '{0}' not found")]
    NodeNameNotFound(String),

    /// An identical endpoint already exists at this output slot
    ///
    /// Fields are `*_node` rather than `source` because thiserror gives a
    /// field named `source` the `Error::source()` cause role.
    #[error("connection from '{source_node}' to '{target_node}' already exists")]
    DuplicateConnection {
        source_node: String,
        target_node: String,
    },

    /// No endpoint matching the requested source/target/slot exists
    #[error("no connection from '{source_node}' to '{target_node}' matches")]
    ConnectionNotFound {
        source_node: String,
        target_node: String,
    },

    /// The workflow shape has no field with this name
    #[error("unknown workflow property '{0}'")]
    UnknownProperty(String),

    /// The supplied value has the wrong shape for this workflow field
    #[error("invalid value for workflow property '{property}': {reason}")]
    InvalidPropertyValue { property: String, reason: String },

    /// The tag is already present on the workflow
    #[error("tag '{0}' already exists")]
    DuplicateTag(String),

    /// The tag is not present on the workflow
    #[error("tag '{0}' not found")]
    TagNotFound(String),
}
