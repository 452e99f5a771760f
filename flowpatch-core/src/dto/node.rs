//! Point-mutation request/response shapes

use serde::{Deserialize, Serialize};

use crate::domain::workflow::ParameterMap;

/// Request to create a node in a workflow
///
/// Name defaults to the last dot-segment of the type; position defaults
/// to the right of the current rightmost node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<ParameterMap>,
}

/// Request to update an existing node
///
/// Supplied parameter/credential maps merge additively onto the existing
/// ones; name and typeVersion overwrite when supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateNodeRequest {
    pub name: Option<String>,
    pub parameters: Option<ParameterMap>,
    pub credentials: Option<ParameterMap>,
    pub type_version: Option<i64>,
}

/// Source endpoint of a connect request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_index: Option<usize>,
}

/// Target endpoint of a connect request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_index: Option<usize>,
}

/// Response naming the node a mutation created or touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub node_id: String,
}

/// Bare acknowledgement for mutations with nothing else to report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
