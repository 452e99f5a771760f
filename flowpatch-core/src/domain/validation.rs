//! Validation results
//!
//! Structured outcome of configuration validation. Validation problems
//! are always data, never errors: the caller decides whether to proceed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of validating a parameter/credential set against a descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Build a result from collected errors; valid iff there are none.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// One validation problem, with expected/actual values for tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub property: String,
    pub message: String,
    pub code: ValidationCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl ValidationError {
    pub fn new(property: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            code,
            expected: None,
            actual: None,
        }
    }

    pub fn with_expected(mut self, expected: Value) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_actual(mut self, actual: Value) -> Self {
        self.actual = Some(actual);
        self
    }
}

/// Machine codes for validation problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    MissingRequired,
    InvalidType,
    InvalidEnum,
    InvalidRange,
    MissingCredential,
}
