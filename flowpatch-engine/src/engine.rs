//! The mutation engine
//!
//! Public operations over a remote workflow document: atomic batch apply
//! plus the point mutations (create/update/delete a node, connect two
//! nodes, reposition a node), each wrapped in a versioned
//! read-mutate-write cycle.
//!
//! Only version-precondition conflicts are retried; operation errors
//! ("node not found", duplicate connection, ...) propagate immediately so
//! a caller can tell "your edit was wrong" apart from "someone else
//! changed this concurrently".

use thiserror::Error;
use tracing::{info, warn};

use flowpatch_core::OperationError;
use flowpatch_core::batch::{self, Operation};
use flowpatch_core::domain::descriptor::DescriptorCatalog;
use flowpatch_core::domain::validation::ValidationResult;
use flowpatch_core::domain::workflow::{
    ConnectionEndpoint, MAIN_CONNECTION, Node, ParameterMap, Workflow,
};
use flowpatch_core::dto::batch::BatchReport;
use flowpatch_core::dto::node::{
    Ack, CreateNodeRequest, NodeRef, SourceRef, TargetRef, UpdateNodeRequest,
};
use flowpatch_core::validate;

use crate::config::EngineConfig;
use crate::store::{StoreError, WorkflowStore};

/// Errors surfaced by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested edit itself was wrong; never retried
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The document kept changing under us until the retry budget ran
    /// out; the caller may retry the whole request
    #[error("workflow '{workflow_id}' was modified concurrently; gave up after {attempts} attempts")]
    Conflict { workflow_id: String, attempts: u32 },

    /// The store failed in a way that is not a version conflict
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The workflow mutation engine
///
/// Owns a store handle, the node-type catalog and the retry
/// configuration. Each apply cycle works on its own private copy of the
/// document; the store's version tag is the only coordination point with
/// other writers.
pub struct Engine<S, C> {
    store: S,
    catalog: C,
    config: EngineConfig,
}

impl<S, C> Engine<S, C>
where
    S: WorkflowStore,
    C: DescriptorCatalog,
{
    /// Create an engine with the default retry configuration
    pub fn new(store: S, catalog: C) -> Self {
        Self::with_config(store, catalog, EngineConfig::default())
    }

    pub fn with_config(store: S, catalog: C, config: EngineConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Access the underlying store handle
    pub fn store(&self) -> &S {
        &self.store
    }

    // =============================================================================
    // Batch apply
    // =============================================================================

    /// Apply an ordered list of operations atomically.
    ///
    /// The batch runs against a private copy of the current document; on
    /// success the result is persisted under the version tag read at the
    /// start of the cycle, and a concurrent change re-runs the whole
    /// batch against the fresh document. A rejected batch is reported as
    /// structured data and nothing is written.
    pub async fn apply_batch(
        &self,
        workflow_id: &str,
        operations: &[Operation],
    ) -> Result<BatchReport, EngineError> {
        let mut attempt = 0;
        let mut delay = self.config.base_delay;
        loop {
            attempt += 1;
            let current = self.store.get(workflow_id).await?;

            let transformed = match batch::apply(&current.workflow, operations) {
                Ok(workflow) => workflow,
                Err(failure) => {
                    info!(
                        workflow_id,
                        operation_index = failure.operation_index,
                        error = %failure.error,
                        "batch rejected"
                    );
                    return Ok(BatchReport::failure(failure));
                }
            };

            match self
                .store
                .put(workflow_id, &transformed, Some(&current.version))
                .await
            {
                Ok(stored) => {
                    info!(
                        workflow_id,
                        operations = operations.len(),
                        "batch applied"
                    );
                    return Ok(BatchReport::success(stored.workflow));
                }
                Err(StoreError::PreconditionFailed) => {
                    let wait = self.backoff_or_give_up(workflow_id, attempt, &mut delay)?;
                    tokio::time::sleep(wait).await;
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    // =============================================================================
    // Point mutations
    // =============================================================================

    /// Add a node to a workflow.
    ///
    /// Generates a fresh node id; name defaults to the last dot-segment
    /// of the type, position to the right of the current rightmost node.
    pub async fn create_node(
        &self,
        workflow_id: &str,
        request: CreateNodeRequest,
    ) -> Result<NodeRef, EngineError> {
        let node_id = Node::generate_id();
        self.mutate_with_retry(workflow_id, |workflow| {
            let node = Node {
                id: node_id.clone(),
                name: request
                    .name
                    .clone()
                    .unwrap_or_else(|| Node::default_name(&request.node_type)),
                node_type: request.node_type.clone(),
                type_version: 1,
                position: request.position.unwrap_or_else(|| workflow.next_position()),
                parameters: request.parameters.clone().unwrap_or_default(),
                credentials: request.credentials.clone().unwrap_or_default(),
                disabled: None,
                notes: None,
            };
            workflow.nodes.push(node);
            Ok(())
        })
        .await?;

        info!(workflow_id, %node_id, node_type = %request.node_type, "node created");
        Ok(NodeRef { node_id })
    }

    /// Update an existing node.
    ///
    /// Supplied parameter/credential maps merge additively onto the
    /// existing ones; name and typeVersion overwrite when supplied.
    pub async fn update_node(
        &self,
        workflow_id: &str,
        node_id: &str,
        request: UpdateNodeRequest,
    ) -> Result<NodeRef, EngineError> {
        self.mutate_with_retry(workflow_id, |workflow| {
            let node = workflow
                .node_mut(node_id)
                .ok_or_else(|| OperationError::NodeNotFound(node_id.to_string()))?;
            if let Some(name) = &request.name {
                node.name = name.clone();
            }
            if let Some(type_version) = request.type_version {
                node.type_version = type_version;
            }
            if let Some(parameters) = &request.parameters {
                merge_into(&mut node.parameters, parameters);
            }
            if let Some(credentials) = &request.credentials {
                merge_into(&mut node.credentials, credentials);
            }
            Ok(())
        })
        .await?;

        info!(workflow_id, node_id, "node updated");
        Ok(NodeRef {
            node_id: node_id.to_string(),
        })
    }

    /// Connect two nodes, referenced by id; indices default to slot 0.
    pub async fn connect_nodes(
        &self,
        workflow_id: &str,
        from: SourceRef,
        to: TargetRef,
    ) -> Result<Ack, EngineError> {
        self.mutate_with_retry(workflow_id, |workflow| {
            let source = workflow
                .node(&from.node_id)
                .ok_or_else(|| OperationError::NodeNotFound(from.node_id.clone()))?
                .name
                .clone();
            let target = workflow
                .node(&to.node_id)
                .ok_or_else(|| OperationError::NodeNotFound(to.node_id.clone()))?
                .name
                .clone();
            workflow.connections.add_endpoint(
                &source,
                MAIN_CONNECTION,
                from.output_index.unwrap_or(0),
                ConnectionEndpoint {
                    target_node_name: target,
                    input_type: MAIN_CONNECTION.to_string(),
                    input_index: to.input_index.unwrap_or(0),
                },
            )
        })
        .await?;

        info!(
            workflow_id,
            from = %from.node_id,
            to = %to.node_id,
            "nodes connected"
        );
        Ok(Ack::ok())
    }

    /// Delete a node by id, cascading into connection cleanup.
    pub async fn delete_node(&self, workflow_id: &str, node_id: &str) -> Result<Ack, EngineError> {
        self.mutate_with_retry(workflow_id, |workflow| {
            workflow.remove_node(node_id).map(|_| ())
        })
        .await?;

        info!(workflow_id, node_id, "node deleted");
        Ok(Ack::ok())
    }

    /// Overwrite a node's canvas position.
    pub async fn set_node_position(
        &self,
        workflow_id: &str,
        node_id: &str,
        x: f64,
        y: f64,
    ) -> Result<Ack, EngineError> {
        self.mutate_with_retry(workflow_id, |workflow| {
            let node = workflow
                .node_mut(node_id)
                .ok_or_else(|| OperationError::NodeNotFound(node_id.to_string()))?;
            node.position = (x, y);
            Ok(())
        })
        .await?;

        Ok(Ack::ok())
    }

    // =============================================================================
    // Validation passthrough
    // =============================================================================

    /// Validate a node configuration against the catalog.
    ///
    /// Pure and side-effect free; problems come back as data, not errors.
    pub fn validate_node_config(
        &self,
        node_type: &str,
        parameters: &ParameterMap,
        credentials: Option<&ParameterMap>,
    ) -> ValidationResult {
        match credentials {
            Some(credentials) => {
                validate::validate_full(&self.catalog, node_type, parameters, credentials)
            }
            None => validate::validate(&self.catalog, node_type, parameters),
        }
    }

    // =============================================================================
    // Retry cycle
    // =============================================================================

    /// Run one point mutation inside the versioned read-mutate-write
    /// cycle. Only `StoreError::PreconditionFailed` on the write is
    /// retried; everything else, operation errors included, propagates
    /// unchanged.
    async fn mutate_with_retry<F>(&self, workflow_id: &str, mut mutate: F) -> Result<(), EngineError>
    where
        F: FnMut(&mut Workflow) -> Result<(), OperationError>,
    {
        let mut attempt = 0;
        let mut delay = self.config.base_delay;
        loop {
            attempt += 1;
            let mut current = self.store.get(workflow_id).await?;
            mutate(&mut current.workflow)?;

            match self
                .store
                .put(workflow_id, &current.workflow, Some(&current.version))
                .await
            {
                Ok(_) => return Ok(()),
                Err(StoreError::PreconditionFailed) => {
                    let wait = self.backoff_or_give_up(workflow_id, attempt, &mut delay)?;
                    tokio::time::sleep(wait).await;
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    fn backoff_or_give_up(
        &self,
        workflow_id: &str,
        attempt: u32,
        delay: &mut std::time::Duration,
    ) -> Result<std::time::Duration, EngineError> {
        if attempt >= self.config.max_attempts {
            warn!(
                workflow_id,
                attempts = attempt,
                "giving up after repeated version conflicts"
            );
            return Err(EngineError::Conflict {
                workflow_id: workflow_id.to_string(),
                attempts: attempt,
            });
        }
        warn!(
            workflow_id,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "concurrent modification detected, retrying"
        );
        let wait = *delay;
        *delay *= 2;
        Ok(wait)
    }
}

fn merge_into(existing: &mut ParameterMap, supplied: &ParameterMap) {
    for (key, value) in supplied {
        existing.insert(key.clone(), value.clone());
    }
}
