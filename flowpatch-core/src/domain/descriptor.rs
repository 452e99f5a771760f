//! Node-type descriptors
//!
//! Per-type schema consumed from the static catalog: declared properties,
//! their kinds and constraints, conditional visibility rules, and declared
//! credential requirements. The catalog is the single source of
//! type-specific behavior; nothing in this crate special-cases node types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::workflow::ParameterMap;

/// Schema for one node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub credentials: Vec<CredentialRequirement>,
}

/// Schema for one configurable property of a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default)]
    pub required: bool,
    /// Allowed value literals for `options` / `multiOptions` kinds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    /// Inclusive bounds for `number` kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

/// Declared kinds for node properties
///
/// Kinds the validator does not recognize deserialize into `Other` and are
/// accepted without checks, so a newer catalog never breaks older engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Options,
    MultiOptions,
    Credentials,
    Collection,
    FixedCollection,
    Hidden,
    Notice,
    #[serde(untagged)]
    Other(String),
}

/// Conditional visibility rules for a property, evaluated against the
/// full candidate parameter set.
///
/// `show`: the property is visible only when every named sibling equals
/// one of its listed values. `hide`: the property is hidden when any
/// named sibling equals one of its listed values. A hidden property is
/// skipped by validation entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub show: BTreeMap<String, Vec<Value>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hide: BTreeMap<String, Vec<Value>>,
}

impl DisplayOptions {
    /// Evaluate the visibility predicate against a parameter set.
    pub fn is_visible(&self, parameters: &ParameterMap) -> bool {
        for (sibling, allowed) in &self.show {
            let matches = parameters
                .get(sibling)
                .is_some_and(|value| allowed.contains(value));
            if !matches {
                return false;
            }
        }
        for (sibling, allowed) in &self.hide {
            let matches = parameters
                .get(sibling)
                .is_some_and(|value| allowed.contains(value));
            if matches {
                return false;
            }
        }
        true
    }
}

/// A credential slot declared by a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequirement {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

/// Read-only lookup into the node-type catalog
pub trait DescriptorCatalog {
    /// Fetch the descriptor for a type name, if the catalog knows it.
    fn describe(&self, type_name: &str) -> Option<&NodeTypeDescriptor>;
}

/// In-memory catalog backed by a map, loadable from a JSON descriptor list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: HashMap<String, NodeTypeDescriptor>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own type name.
    pub fn register(&mut self, descriptor: NodeTypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Build a catalog from a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let descriptors: Vec<NodeTypeDescriptor> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.register(descriptor);
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl DescriptorCatalog for StaticCatalog {
    fn describe(&self, type_name: &str) -> Option<&NodeTypeDescriptor> {
        self.types.get(type_name)
    }
}
