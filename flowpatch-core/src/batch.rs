//! Batch operation processor
//!
//! Applies an ordered list of graph edits to a private copy of a workflow,
//! strictly sequentially and atomically: the first failing operation
//! aborts the batch and the caller's document is never touched, so the
//! outcome is all-or-nothing even though earlier operations briefly
//! mutated the working copy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::workflow::{
    ConnectionEndpoint, MAIN_CONNECTION, Node, ParameterMap, Workflow,
};
use crate::error::OperationError;
use crate::params;

/// One graph edit in a batch, tagged by kind on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Append a node; fails when its id is already taken.
    AddNode { node: Node },
    /// Remove a node by id, cascading into connection cleanup.
    DeleteNode { node_id: String },
    /// Shallow-merge field updates onto an existing node.
    UpdateNode { node_id: String, updates: NodeUpdate },
    /// Write a value at a dot-separated path in a node's parameters.
    SetParam {
        node_id: String,
        path: String,
        value: Value,
    },
    /// Delete the value at a dot-separated path; a no-op when the path
    /// does not resolve.
    UnsetParam { node_id: String, path: String },
    /// Append an endpoint between two nodes, referenced by name.
    Connect {
        source: String,
        target: String,
        #[serde(default = "main_connection")]
        connection_type: String,
        #[serde(default)]
        output_index: usize,
        #[serde(default)]
        input_index: usize,
    },
    /// Remove the one matching endpoint, pruning emptied containers.
    Disconnect {
        source: String,
        target: String,
        #[serde(default = "main_connection")]
        connection_type: String,
        #[serde(default)]
        output_index: usize,
        #[serde(default)]
        input_index: usize,
    },
    /// Overwrite a named top-level workflow field.
    SetWorkflowProperty { name: String, value: Value },
    /// Append a tag; fails when already present.
    AddTag { tag: String },
    /// Remove a tag; fails when absent.
    RemoveTag { tag: String },
}

fn main_connection() -> String {
    MAIN_CONNECTION.to_string()
}

/// Field updates for an existing node; only supplied fields are touched.
/// Supplied parameter/credential maps replace the existing ones wholesale
/// (the merge is shallow, at node-field level).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub type_version: Option<i64>,
    pub position: Option<(f64, f64)>,
    pub parameters: Option<ParameterMap>,
    pub credentials: Option<ParameterMap>,
    pub disabled: Option<bool>,
    pub notes: Option<String>,
}

/// The failing operation of a rejected batch: its position in the list,
/// the operation itself, and what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchError {
    pub operation_index: usize,
    pub operation: Operation,
    pub error: OperationError,
}

/// Apply every operation in order to a copy of `workflow`.
///
/// Returns the fully transformed workflow, or the first failure with the
/// input left untouched. No later operation is attempted after a failure.
pub fn apply(workflow: &Workflow, operations: &[Operation]) -> Result<Workflow, BatchError> {
    let mut working = workflow.clone();
    for (operation_index, operation) in operations.iter().enumerate() {
        apply_operation(&mut working, operation).map_err(|error| BatchError {
            operation_index,
            operation: operation.clone(),
            error,
        })?;
    }
    Ok(working)
}

fn apply_operation(workflow: &mut Workflow, operation: &Operation) -> Result<(), OperationError> {
    match operation {
        Operation::AddNode { node } => {
            if workflow.node(&node.id).is_some() {
                return Err(OperationError::DuplicateNodeId(node.id.clone()));
            }
            workflow.nodes.push(node.clone());
            Ok(())
        }
        Operation::DeleteNode { node_id } => workflow.remove_node(node_id).map(|_| ()),
        Operation::UpdateNode { node_id, updates } => {
            let node = workflow
                .node_mut(node_id)
                .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
            merge_update(node, updates);
            Ok(())
        }
        Operation::SetParam {
            node_id,
            path,
            value,
        } => {
            let node = workflow
                .node_mut(node_id)
                .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
            params::set_path(&mut node.parameters, path, value.clone());
            Ok(())
        }
        Operation::UnsetParam { node_id, path } => {
            let node = workflow
                .node_mut(node_id)
                .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
            params::unset_path(&mut node.parameters, path);
            Ok(())
        }
        Operation::Connect {
            source,
            target,
            connection_type,
            output_index,
            input_index,
        } => {
            if workflow.node_by_name(source).is_none() {
                return Err(OperationError::NodeNameNotFound(source.clone()));
            }
            if workflow.node_by_name(target).is_none() {
                return Err(OperationError::NodeNameNotFound(target.clone()));
            }
            workflow.connections.add_endpoint(
                source,
                connection_type,
                *output_index,
                ConnectionEndpoint {
                    target_node_name: target.clone(),
                    input_type: connection_type.clone(),
                    input_index: *input_index,
                },
            )
        }
        Operation::Disconnect {
            source,
            target,
            connection_type,
            output_index,
            input_index,
        } => workflow.connections.remove_endpoint(
            source,
            connection_type,
            *output_index,
            &ConnectionEndpoint {
                target_node_name: target.clone(),
                input_type: connection_type.clone(),
                input_index: *input_index,
            },
        ),
        Operation::SetWorkflowProperty { name, value } => {
            set_workflow_property(workflow, name, value)
        }
        Operation::AddTag { tag } => {
            if workflow.tags.contains(tag) {
                return Err(OperationError::DuplicateTag(tag.clone()));
            }
            workflow.tags.push(tag.clone());
            Ok(())
        }
        Operation::RemoveTag { tag } => {
            let position = workflow
                .tags
                .iter()
                .position(|t| t == tag)
                .ok_or_else(|| OperationError::TagNotFound(tag.clone()))?;
            workflow.tags.remove(position);
            Ok(())
        }
    }
}

fn merge_update(node: &mut Node, updates: &NodeUpdate) {
    if let Some(name) = &updates.name {
        node.name = name.clone();
    }
    if let Some(node_type) = &updates.node_type {
        node.node_type = node_type.clone();
    }
    if let Some(type_version) = updates.type_version {
        node.type_version = type_version;
    }
    if let Some(position) = updates.position {
        node.position = position;
    }
    if let Some(parameters) = &updates.parameters {
        node.parameters = parameters.clone();
    }
    if let Some(credentials) = &updates.credentials {
        node.credentials = credentials.clone();
    }
    if let Some(disabled) = updates.disabled {
        node.disabled = Some(disabled);
    }
    if let Some(notes) = &updates.notes {
        node.notes = Some(notes.clone());
    }
}

fn set_workflow_property(
    workflow: &mut Workflow,
    name: &str,
    value: &Value,
) -> Result<(), OperationError> {
    let wrong_shape = |reason: &str| OperationError::InvalidPropertyValue {
        property: name.to_string(),
        reason: reason.to_string(),
    };
    match name {
        "name" => {
            workflow.name = value
                .as_str()
                .ok_or_else(|| wrong_shape("expected a string"))?
                .to_string();
            Ok(())
        }
        "active" => {
            workflow.active = value
                .as_bool()
                .ok_or_else(|| wrong_shape("expected a boolean"))?;
            Ok(())
        }
        "settings" => {
            workflow.settings = value
                .as_object()
                .ok_or_else(|| wrong_shape("expected an object"))?
                .clone();
            Ok(())
        }
        other => Err(OperationError::UnknownProperty(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::Connections;
    use serde_json::json;

    fn node(id: &str, name: &str, node_type: &str) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
            node_type: node_type.to_string(),
            type_version: 1,
            position: (0.0, 0.0),
            parameters: ParameterMap::new(),
            credentials: ParameterMap::new(),
            disabled: None,
            notes: None,
        }
    }

    fn workflow() -> Workflow {
        Workflow {
            id: Some("wf-1".to_string()),
            name: "test".to_string(),
            nodes: vec![
                node("1", "A", "n8n-nodes-base.webhook"),
                node("2", "B", "n8n-nodes-base.set"),
            ],
            connections: Connections::default(),
            active: false,
            tags: vec!["prod".to_string()],
            settings: ParameterMap::new(),
        }
    }

    fn connect(source: &str, target: &str) -> Operation {
        Operation::Connect {
            source: source.to_string(),
            target: target.to_string(),
            connection_type: MAIN_CONNECTION.to_string(),
            output_index: 0,
            input_index: 0,
        }
    }

    #[test]
    fn test_empty_batch_is_identity() {
        let original = workflow();
        let result = apply(&original, &[]).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn test_failed_batch_leaves_input_untouched() {
        let original = workflow();
        let pristine = original.clone();

        // second add collides with the first
        let operations = vec![
            Operation::AddNode {
                node: node("webhook-1", "Hook", "n8n-nodes-base.webhook"),
            },
            Operation::AddNode {
                node: node("webhook-1", "Hook2", "n8n-nodes-base.webhook"),
            },
        ];
        let failure = apply(&original, &operations).unwrap_err();

        assert_eq!(failure.operation_index, 1);
        assert!(failure.error.to_string().contains("already exists"));
        assert_eq!(original, pristine);
        assert_eq!(original.nodes.len(), 2);
    }

    #[test]
    fn test_sequential_operations_compose() {
        let original = workflow();
        let operations = vec![
            Operation::AddNode {
                node: node("3", "C", "n8n-nodes-base.noOp"),
            },
            connect("A", "C"),
            Operation::SetParam {
                node_id: "3".to_string(),
                path: "options.retry.count".to_string(),
                value: json!(2),
            },
        ];
        let result = apply(&original, &operations).unwrap();

        assert_eq!(result.nodes.len(), 3);
        assert_eq!(
            result.connections.0["A"][MAIN_CONNECTION][0][0].target_node_name,
            "C"
        );
        assert_eq!(
            params::get_path(&result.node("3").unwrap().parameters, "options.retry.count"),
            Some(&json!(2))
        );
    }

    #[test]
    fn test_delete_node_cleans_connections() {
        let original = workflow();
        let connected = apply(&original, &[connect("A", "B")]).unwrap();

        let result = apply(
            &connected,
            &[Operation::DeleteNode {
                node_id: "1".to_string(),
            }],
        )
        .unwrap();

        assert!(result.node("1").is_none());
        // no entry for A may remain, not even an empty one
        assert!(!result.connections.0.contains_key("A"));
    }

    #[test]
    fn test_delete_missing_node_fails() {
        let failure = apply(
            &workflow(),
            &[Operation::DeleteNode {
                node_id: "nope".to_string(),
            }],
        )
        .unwrap_err();
        assert_eq!(failure.operation_index, 0);
        assert!(matches!(failure.error, OperationError::NodeNotFound(_)));
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let failure = apply(&workflow(), &[connect("A", "B"), connect("A", "B")]).unwrap_err();
        assert_eq!(failure.operation_index, 1);
        assert!(matches!(
            failure.error,
            OperationError::DuplicateConnection { .. }
        ));
    }

    #[test]
    fn test_connect_missing_endpoint_fails() {
        let failure = apply(&workflow(), &[connect("A", "Z")]).unwrap_err();
        assert!(matches!(
            failure.error,
            OperationError::NodeNameNotFound(ref name) if name == "Z"
        ));
    }

    #[test]
    fn test_disconnect_removes_and_prunes() {
        let connected = apply(&workflow(), &[connect("A", "B")]).unwrap();
        let result = apply(
            &connected,
            &[Operation::Disconnect {
                source: "A".to_string(),
                target: "B".to_string(),
                connection_type: MAIN_CONNECTION.to_string(),
                output_index: 0,
                input_index: 0,
            }],
        )
        .unwrap();
        assert!(result.connections.is_empty());
    }

    #[test]
    fn test_disconnect_without_connection_fails() {
        let failure = apply(
            &workflow(),
            &[Operation::Disconnect {
                source: "A".to_string(),
                target: "B".to_string(),
                connection_type: MAIN_CONNECTION.to_string(),
                output_index: 0,
                input_index: 0,
            }],
        )
        .unwrap_err();
        assert!(matches!(
            failure.error,
            OperationError::ConnectionNotFound { .. }
        ));
    }

    #[test]
    fn test_update_node_shallow_merge() {
        let result = apply(
            &workflow(),
            &[Operation::UpdateNode {
                node_id: "1".to_string(),
                updates: NodeUpdate {
                    name: Some("Renamed".to_string()),
                    type_version: Some(2),
                    ..NodeUpdate::default()
                },
            }],
        )
        .unwrap();

        let updated = result.node("1").unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.type_version, 2);
        // untouched fields survive
        assert_eq!(updated.node_type, "n8n-nodes-base.webhook");
    }

    #[test]
    fn test_unset_param_noop_when_absent() {
        let result = apply(
            &workflow(),
            &[Operation::UnsetParam {
                node_id: "1".to_string(),
                path: "options.retry.count".to_string(),
            }],
        )
        .unwrap();
        assert!(result.node("1").unwrap().parameters.is_empty());
    }

    #[test]
    fn test_unset_param_missing_node_fails() {
        let failure = apply(
            &workflow(),
            &[Operation::UnsetParam {
                node_id: "nope".to_string(),
                path: "x".to_string(),
            }],
        )
        .unwrap_err();
        assert!(matches!(failure.error, OperationError::NodeNotFound(_)));
    }

    #[test]
    fn test_set_workflow_property() {
        let result = apply(
            &workflow(),
            &[
                Operation::SetWorkflowProperty {
                    name: "name".to_string(),
                    value: json!("renamed"),
                },
                Operation::SetWorkflowProperty {
                    name: "active".to_string(),
                    value: json!(true),
                },
            ],
        )
        .unwrap();
        assert_eq!(result.name, "renamed");
        assert!(result.active);
    }

    #[test]
    fn test_unknown_workflow_property_fails() {
        let failure = apply(
            &workflow(),
            &[Operation::SetWorkflowProperty {
                name: "owner".to_string(),
                value: json!("me"),
            }],
        )
        .unwrap_err();
        assert!(matches!(failure.error, OperationError::UnknownProperty(_)));
    }

    #[test]
    fn test_tag_operations() {
        let result = apply(
            &workflow(),
            &[
                Operation::AddTag {
                    tag: "beta".to_string(),
                },
                Operation::RemoveTag {
                    tag: "prod".to_string(),
                },
            ],
        )
        .unwrap();
        assert_eq!(result.tags, vec!["beta".to_string()]);

        let duplicate = apply(
            &workflow(),
            &[Operation::AddTag {
                tag: "prod".to_string(),
            }],
        )
        .unwrap_err();
        assert!(matches!(duplicate.error, OperationError::DuplicateTag(_)));

        let missing = apply(
            &workflow(),
            &[Operation::RemoveTag {
                tag: "qa".to_string(),
            }],
        )
        .unwrap_err();
        assert!(matches!(missing.error, OperationError::TagNotFound(_)));
    }

    #[test]
    fn test_operation_wire_format() {
        let operation: Operation = serde_json::from_value(json!({
            "type": "connect",
            "source": "A",
            "target": "B",
            "outputIndex": 1
        }))
        .unwrap();
        assert_eq!(
            operation,
            Operation::Connect {
                source: "A".to_string(),
                target: "B".to_string(),
                connection_type: MAIN_CONNECTION.to_string(),
                output_index: 1,
                input_index: 0,
            }
        );

        // a kind this engine does not know is rejected at parse time
        let unknown = serde_json::from_value::<Operation>(json!({"type": "renameTag"}));
        assert!(unknown.is_err());
    }
}
