//! Workflow document types
//!
//! The in-memory representation of a workflow definition: a list of typed
//! nodes plus the connection map between them. This is the JSON document
//! exchanged with the remote store, so everything serializes camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OperationError;

/// Open key/value map used for node parameters, credentials and workflow
/// settings.
pub type ParameterMap = serde_json::Map<String, Value>;

/// Horizontal gap between an existing rightmost node and a newly placed one.
pub const DEFAULT_NODE_SPACING: f64 = 200.0;

/// The conventional connection type label for data-flow edges.
pub const MAIN_CONNECTION: &str = "main";

/// A workflow definition
///
/// Structure shared between the store client (persists) and the mutation
/// engine (edits). The id is absent until the store has created the
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Connections,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "ParameterMap::is_empty")]
    pub settings: ParameterMap,
}

impl Workflow {
    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a node by id, mutably
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Look up a node by display name (the key space of the connection map)
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Default canvas position for a new node: a fixed gap to the right of
    /// the current rightmost node, same vertical coordinate. Origin for an
    /// empty workflow.
    pub fn next_position(&self) -> (f64, f64) {
        self.nodes
            .iter()
            .max_by(|a, b| a.position.0.total_cmp(&b.position.0))
            .map(|n| (n.position.0 + DEFAULT_NODE_SPACING, n.position.1))
            .unwrap_or((0.0, 0.0))
    }

    /// Remove the node with the given id and cascade into the connection
    /// map: its outgoing entry disappears and every inbound endpoint
    /// naming it is stripped, pruning any container emptied on the way.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, OperationError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| OperationError::NodeNotFound(id.to_string()))?;
        let node = self.nodes.remove(index);
        self.connections.remove_node(&node.name);
        Ok(node)
    }
}

/// A typed unit in the graph
///
/// The id is assigned by the engine on creation and immutable thereafter;
/// the name must be unique within the workflow because connections
/// reference nodes by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default = "default_type_version")]
    pub type_version: i64,
    #[serde(default)]
    pub position: (f64, f64),
    #[serde(default)]
    pub parameters: ParameterMap,
    #[serde(default, skip_serializing_if = "ParameterMap::is_empty")]
    pub credentials: ParameterMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_type_version() -> i64 {
    1
}

impl Node {
    /// Generate a fresh node id: millisecond timestamp plus a random
    /// suffix, unlikely to collide and roughly sortable by creation time.
    pub fn generate_id() -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("node_{}_{}", millis, &suffix[..8])
    }

    /// Default display name for a type: its last dot-segment
    /// ("n8n-nodes-base.httpRequest" -> "httpRequest").
    pub fn default_name(node_type: &str) -> String {
        node_type
            .rsplit('.')
            .next()
            .unwrap_or(node_type)
            .to_string()
    }
}

/// One endpoint of a directed edge: the target node (by name), the input
/// type label on that node, and the input slot index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEndpoint {
    pub target_node_name: String,
    pub input_type: String,
    pub input_index: usize,
}

/// Output slots of one source: indexed by output slot number, each slot
/// holding an unordered list of endpoints.
pub type OutputSlots = Vec<Vec<ConnectionEndpoint>>;

/// All outputs of one source, keyed by output-type label.
pub type OutputMap = BTreeMap<String, OutputSlots>;

/// The connection map of a workflow: source node name -> output-type
/// label -> output slot -> endpoints.
///
/// Invariant: no empty slot list, output-type entry or source entry is
/// ever left behind by a removal; pruning keeps document equality and
/// round-trip comparisons stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connections(pub BTreeMap<String, OutputMap>);

impl Connections {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any entry references the named node, as source or target.
    pub fn references(&self, name: &str) -> bool {
        self.0.contains_key(name)
            || self.0.values().any(|outputs| {
                outputs.values().any(|slots| {
                    slots
                        .iter()
                        .any(|slot| slot.iter().any(|e| e.target_node_name == name))
                })
            })
    }

    /// Append an endpoint at `source[output_type][output_index]`, growing
    /// intermediate slot arrays as needed. An identical
    /// `(target, inputType, inputIndex)` endpoint at that slot is rejected.
    pub fn add_endpoint(
        &mut self,
        source: &str,
        output_type: &str,
        output_index: usize,
        endpoint: ConnectionEndpoint,
    ) -> Result<(), OperationError> {
        let slots = self
            .0
            .entry(source.to_string())
            .or_default()
            .entry(output_type.to_string())
            .or_default();
        while slots.len() <= output_index {
            slots.push(Vec::new());
        }
        let slot = &mut slots[output_index];
        if slot.contains(&endpoint) {
            return Err(OperationError::DuplicateConnection {
                source_node: source.to_string(),
                target_node: endpoint.target_node_name,
            });
        }
        slot.push(endpoint);
        Ok(())
    }

    /// Remove the one endpoint matching the given source/slot/target
    /// coordinates, pruning any slot, output-type or source entry the
    /// removal emptied.
    pub fn remove_endpoint(
        &mut self,
        source: &str,
        output_type: &str,
        output_index: usize,
        endpoint: &ConnectionEndpoint,
    ) -> Result<(), OperationError> {
        let not_found = || OperationError::ConnectionNotFound {
            source_node: source.to_string(),
            target_node: endpoint.target_node_name.clone(),
        };
        let outputs = self.0.get_mut(source).ok_or_else(not_found)?;
        let slots = outputs.get_mut(output_type).ok_or_else(not_found)?;
        let slot = slots.get_mut(output_index).ok_or_else(not_found)?;
        let position = slot.iter().position(|e| e == endpoint).ok_or_else(not_found)?;
        slot.remove(position);

        Self::prune_slots(slots);
        if slots.is_empty() {
            outputs.remove(output_type);
        }
        if outputs.is_empty() {
            self.0.remove(source);
        }
        Ok(())
    }

    /// Drop everything the named node participates in: its own source
    /// entry and every inbound endpoint under other sources, with full
    /// pruning of emptied containers.
    pub fn remove_node(&mut self, name: &str) {
        self.0.remove(name);
        self.0.retain(|_, outputs| {
            outputs.retain(|_, slots| {
                for slot in slots.iter_mut() {
                    slot.retain(|e| e.target_node_name != name);
                }
                Self::prune_slots(slots);
                !slots.is_empty()
            });
            !outputs.is_empty()
        });
    }

    // Trailing empty slots carry no information; interior empty slots are
    // index padding for later occupied slots and must stay.
    fn prune_slots(slots: &mut OutputSlots) {
        while slots.last().is_some_and(|slot| slot.is_empty()) {
            slots.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(target: &str, index: usize) -> ConnectionEndpoint {
        ConnectionEndpoint {
            target_node_name: target.to_string(),
            input_type: MAIN_CONNECTION.to_string(),
            input_index: index,
        }
    }

    fn node(id: &str, name: &str, x: f64) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
            node_type: "n8n-nodes-base.noOp".to_string(),
            type_version: 1,
            position: (x, 100.0),
            parameters: ParameterMap::new(),
            credentials: ParameterMap::new(),
            disabled: None,
            notes: None,
        }
    }

    #[test]
    fn test_add_endpoint_grows_slots() {
        let mut connections = Connections::default();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 2, endpoint("B", 0))
            .unwrap();

        let slots = &connections.0["A"][MAIN_CONNECTION];
        assert_eq!(slots.len(), 3);
        assert!(slots[0].is_empty());
        assert_eq!(slots[2], vec![endpoint("B", 0)]);
    }

    #[test]
    fn test_duplicate_endpoint_rejected() {
        let mut connections = Connections::default();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();
        let err = connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap_err();
        assert!(matches!(err, OperationError::DuplicateConnection { .. }));
        assert_eq!(connections.0["A"][MAIN_CONNECTION][0].len(), 1);
    }

    #[test]
    fn test_same_slot_different_target_allowed() {
        let mut connections = Connections::default();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("C", 0))
            .unwrap();
        assert_eq!(connections.0["A"][MAIN_CONNECTION][0].len(), 2);
    }

    #[test]
    fn test_remove_endpoint_prunes_empty_containers() {
        let mut connections = Connections::default();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();
        connections
            .remove_endpoint("A", MAIN_CONNECTION, 0, &endpoint("B", 0))
            .unwrap();

        assert!(connections.is_empty());
    }

    #[test]
    fn test_remove_missing_endpoint_fails() {
        let mut connections = Connections::default();
        let err = connections
            .remove_endpoint("A", MAIN_CONNECTION, 0, &endpoint("B", 0))
            .unwrap_err();
        assert!(matches!(err, OperationError::ConnectionNotFound { .. }));
    }

    #[test]
    fn test_remove_node_strips_inbound_and_outbound() {
        let mut connections = Connections::default();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();
        connections
            .add_endpoint("B", MAIN_CONNECTION, 0, endpoint("C", 0))
            .unwrap();
        connections
            .add_endpoint("C", MAIN_CONNECTION, 0, endpoint("B", 1))
            .unwrap();

        connections.remove_node("B");

        assert!(!connections.references("B"));
        // C's only endpoint pointed at B, so its entry must be gone too
        assert!(!connections.0.contains_key("C"));
        assert!(!connections.0.contains_key("B"));
    }

    #[test]
    fn test_interior_empty_slot_kept_for_indexing() {
        let mut connections = Connections::default();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();
        connections
            .add_endpoint("A", MAIN_CONNECTION, 1, endpoint("C", 0))
            .unwrap();
        connections
            .remove_endpoint("A", MAIN_CONNECTION, 0, &endpoint("B", 0))
            .unwrap();

        let slots = &connections.0["A"][MAIN_CONNECTION];
        assert_eq!(slots.len(), 2);
        assert!(slots[0].is_empty());
    }

    #[test]
    fn test_workflow_remove_node_cascades() {
        let mut workflow = Workflow {
            id: Some("wf-1".to_string()),
            name: "test".to_string(),
            nodes: vec![node("1", "A", 0.0), node("2", "B", 200.0)],
            connections: Connections::default(),
            active: false,
            tags: vec![],
            settings: ParameterMap::new(),
        };
        workflow
            .connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();

        workflow.remove_node("1").unwrap();

        assert_eq!(workflow.nodes.len(), 1);
        assert!(workflow.connections.is_empty());
    }

    #[test]
    fn test_next_position_offsets_rightmost() {
        let workflow = Workflow {
            id: None,
            name: "test".to_string(),
            nodes: vec![node("1", "A", 50.0), node("2", "B", 400.0)],
            connections: Connections::default(),
            active: false,
            tags: vec![],
            settings: ParameterMap::new(),
        };
        assert_eq!(workflow.next_position(), (600.0, 100.0));
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(Node::generate_id(), Node::generate_id());
    }

    #[test]
    fn test_default_name_takes_last_segment() {
        assert_eq!(
            Node::default_name("n8n-nodes-base.httpRequest"),
            "httpRequest"
        );
        assert_eq!(Node::default_name("webhook"), "webhook");
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let mut workflow = Workflow {
            id: Some("wf-1".to_string()),
            name: "test".to_string(),
            nodes: vec![node("1", "A", 0.0)],
            connections: Connections::default(),
            active: true,
            tags: vec![],
            settings: ParameterMap::new(),
        };
        workflow
            .connections
            .add_endpoint("A", MAIN_CONNECTION, 0, endpoint("B", 0))
            .unwrap();

        let json = serde_json::to_value(&workflow).unwrap();
        assert_eq!(json["nodes"][0]["type"], "n8n-nodes-base.noOp");
        assert_eq!(json["nodes"][0]["typeVersion"], 1);
        assert_eq!(
            json["connections"]["A"]["main"][0][0]["targetNodeName"],
            "B"
        );
        assert_eq!(json["connections"]["A"]["main"][0][0]["inputIndex"], 0);
    }
}
