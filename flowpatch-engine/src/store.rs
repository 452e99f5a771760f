//! Workflow store interface
//!
//! The engine's view of the remote document service: versioned get/put
//! with an optimistic-concurrency precondition. The HTTP implementation
//! lives in `flowpatch-client`; tests supply in-memory stores.

use async_trait::async_trait;
use flowpatch_core::domain::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque token representing a stored document's state at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A workflow document together with the version tag it was read at
#[derive(Debug, Clone)]
pub struct VersionedWorkflow {
    pub workflow: Workflow,
    pub version: VersionTag,
}

/// Errors surfaced by a workflow store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write's version-tag precondition was not met; the document
    /// changed between read and write. The only transient store error.
    #[error("version precondition failed")]
    PreconditionFailed,

    /// No workflow with this id exists
    #[error("workflow '{0}' not found")]
    NotFound(String),

    /// The store could not be reached or answered with a failure
    #[error("store transport error: {0}")]
    Transport(String),

    /// The store answered with something this engine cannot read
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Versioned document access to the remote workflow store
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Read the current document and its version tag.
    async fn get(&self, id: &str) -> Result<VersionedWorkflow, StoreError>;

    /// Write a document. With a `precondition`, the write only succeeds
    /// if the stored version still matches; otherwise
    /// [`StoreError::PreconditionFailed`] is returned.
    async fn put(
        &self,
        id: &str,
        workflow: &Workflow,
        precondition: Option<&VersionTag>,
    ) -> Result<VersionedWorkflow, StoreError>;
}

#[async_trait]
impl WorkflowStore for flowpatch_client::StoreClient {
    async fn get(&self, id: &str) -> Result<VersionedWorkflow, StoreError> {
        let document = self.get_workflow(id).await.map_err(store_error)?;
        Ok(VersionedWorkflow {
            workflow: document.workflow,
            version: VersionTag::new(document.version),
        })
    }

    async fn put(
        &self,
        id: &str,
        workflow: &Workflow,
        precondition: Option<&VersionTag>,
    ) -> Result<VersionedWorkflow, StoreError> {
        let document = self
            .put_workflow(id, workflow, precondition.map(VersionTag::as_str))
            .await
            .map_err(store_error)?;
        Ok(VersionedWorkflow {
            workflow: document.workflow,
            version: VersionTag::new(document.version),
        })
    }
}

fn store_error(error: flowpatch_client::ClientError) -> StoreError {
    use flowpatch_client::ClientError;
    match error {
        ClientError::PreconditionFailed => StoreError::PreconditionFailed,
        ClientError::NotFound(id) => StoreError::NotFound(id),
        ClientError::ParseError(message) => StoreError::Malformed(message),
        other => StoreError::Transport(other.to_string()),
    }
}
