//! Batch apply report shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::batch::{BatchError, Operation};
use crate::domain::workflow::Workflow;

/// Outcome of a batch apply: the stored workflow on success, or the
/// failing operation on rejection. Never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<BatchFailure>>,
}

impl BatchReport {
    pub fn success(workflow: Workflow) -> Self {
        Self {
            success: true,
            workflow: Some(workflow),
            errors: None,
        }
    }

    pub fn failure(error: BatchError) -> Self {
        Self {
            success: false,
            workflow: None,
            errors: Some(vec![error.into()]),
        }
    }
}

/// Wire form of the failing operation in a rejected batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub operation_index: usize,
    pub operation: Operation,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<BatchError> for BatchFailure {
    fn from(error: BatchError) -> Self {
        Self {
            operation_index: error.operation_index,
            operation: error.operation,
            error: error.error.to_string(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OperationError;
    use serde_json::json;

    #[test]
    fn test_failure_report_wire_shape() {
        let report = BatchReport::failure(BatchError {
            operation_index: 1,
            operation: Operation::AddTag {
                tag: "prod".to_string(),
            },
            error: OperationError::DuplicateTag("prod".to_string()),
        });

        let wire = serde_json::to_value(&report).unwrap();
        assert_eq!(wire["success"], json!(false));
        assert_eq!(wire["errors"][0]["operationIndex"], json!(1));
        assert_eq!(wire["errors"][0]["operation"]["type"], json!("addTag"));
        assert!(
            wire["errors"][0]["error"]
                .as_str()
                .unwrap()
                .contains("already exists")
        );
        assert!(wire.get("workflow").is_none());
    }
}
