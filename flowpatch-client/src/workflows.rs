//! Workflow document endpoints

use flowpatch_core::domain::workflow::Workflow;
use reqwest::StatusCode;
use reqwest::header::{ETAG, IF_MATCH};

use crate::StoreClient;
use crate::error::{ClientError, Result};

/// A workflow document together with the store-assigned version tag it
/// was read (or written) at.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    pub workflow: Workflow,
    /// Opaque token representing the document's state at read time;
    /// present it on the corresponding write as a precondition.
    pub version: String,
}

impl StoreClient {
    /// Fetch a workflow document and its current version tag
    ///
    /// # Arguments
    /// * `id` - The workflow id
    pub async fn get_workflow(&self, id: &str) -> Result<VersionedDocument> {
        let url = format!("{}/api/workflows/{}", self.base_url(), id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id.to_string()));
        }
        let version = version_tag(&response)?;
        let workflow = self.handle_response(response).await?;

        Ok(VersionedDocument { workflow, version })
    }

    /// Store a workflow document
    ///
    /// When `precondition` is given the write only succeeds if the stored
    /// document still carries that version tag; a concurrent change
    /// surfaces as [`ClientError::PreconditionFailed`].
    pub async fn put_workflow(
        &self,
        id: &str,
        workflow: &Workflow,
        precondition: Option<&str>,
    ) -> Result<VersionedDocument> {
        let url = format!("{}/api/workflows/{}", self.base_url(), id);
        let mut request = self.client.put(&url).json(workflow);
        if let Some(tag) = precondition {
            request = request.header(IF_MATCH, tag);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => {
                tracing::debug!(workflow_id = id, "write rejected by version precondition");
                Err(ClientError::PreconditionFailed)
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(id.to_string())),
            _ => {
                let version = version_tag(&response)?;
                let workflow = self.handle_response(response).await?;
                Ok(VersionedDocument { workflow, version })
            }
        }
    }
}

fn version_tag(response: &reqwest::Response) -> Result<String> {
    if !response.status().is_success() {
        // let handle_response turn the body into the error
        return Ok(String::new());
    }
    response
        .headers()
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_matches('"').to_string())
        .ok_or_else(|| ClientError::ParseError("missing ETag header on document".to_string()))
}
