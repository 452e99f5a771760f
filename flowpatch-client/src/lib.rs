//! Flowpatch Store Client
//!
//! A type-safe HTTP client for the remote workflow store: a versioned
//! get/put document service plus the read-only node-type catalog.
//!
//! Every read carries the store-assigned version tag (the response
//! `ETag`); a write presents it back as an `If-Match` precondition so
//! concurrent modification is detected rather than overwritten.
//!
//! # Example
//!
//! ```no_run
//! use flowpatch_client::StoreClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), flowpatch_client::ClientError> {
//!     let client = StoreClient::new("http://localhost:5678");
//!
//!     let doc = client.get_workflow("wf-123").await?;
//!     println!("{} nodes at version {}", doc.workflow.nodes.len(), doc.version);
//!     Ok(())
//! }
//! ```

pub mod error;
mod node_types;
mod workflows;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use workflows::VersionedDocument;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the workflow store API
///
/// Provides the document operations the mutation engine needs:
/// - Workflow documents (versioned get/put)
/// - Node-type descriptors (read-only catalog)
#[derive(Debug, Clone)]
pub struct StoreClient {
    /// Base URL of the store (e.g., "http://localhost:5678")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl StoreClient {
    /// Create a new store client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the store API (e.g., "http://localhost:5678")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new store client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the store
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("failed to parse JSON response: {e}")))
    }
}
