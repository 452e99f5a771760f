//! Node-type catalog endpoints

use flowpatch_core::domain::descriptor::{NodeTypeDescriptor, StaticCatalog};
use reqwest::StatusCode;

use crate::StoreClient;
use crate::error::Result;

impl StoreClient {
    /// Fetch the descriptor for one node type
    ///
    /// Returns `None` when the catalog does not know the type; the
    /// validator treats that as its own error, not a transport failure.
    pub async fn get_node_type(&self, type_name: &str) -> Result<Option<NodeTypeDescriptor>> {
        let url = format!("{}/api/node-types/{}", self.base_url(), type_name);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let descriptor = self.handle_response(response).await?;
        Ok(Some(descriptor))
    }

    /// Fetch the full descriptor catalog
    ///
    /// The catalog is static for the lifetime of the store process, so
    /// callers load it once at startup and hand it to the engine.
    pub async fn load_catalog(&self) -> Result<StaticCatalog> {
        let url = format!("{}/api/node-types", self.base_url());
        let response = self.client.get(&url).send().await?;
        let descriptors: Vec<NodeTypeDescriptor> = self.handle_response(response).await?;

        let mut catalog = StaticCatalog::new();
        for descriptor in descriptors {
            catalog.register(descriptor);
        }
        tracing::info!(types = catalog.len(), "loaded node-type catalog");
        Ok(catalog)
    }
}
