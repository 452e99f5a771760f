//! Configuration validator
//!
//! Schema-driven checks of a proposed node parameter/credential set
//! against the type descriptor, run before any edit reaches the graph.
//! Purely functional over its inputs and the catalog; problems are
//! returned as data, never raised.

use serde_json::{Value, json};

use crate::domain::descriptor::{DescriptorCatalog, NodeTypeDescriptor, PropertyDescriptor, PropertyKind};
use crate::domain::validation::{ValidationCode, ValidationError, ValidationResult};
use crate::domain::workflow::ParameterMap;

/// Validate a parameter set against the descriptor for `node_type`.
///
/// An unknown node type yields a single `INVALID_TYPE` error naming the
/// type; no further checks are meaningful.
pub fn validate(
    catalog: &dyn DescriptorCatalog,
    node_type: &str,
    parameters: &ParameterMap,
) -> ValidationResult {
    let Some(descriptor) = catalog.describe(node_type) else {
        return ValidationResult::from_errors(vec![
            ValidationError::new(
                "type",
                ValidationCode::InvalidType,
                format!("unknown node type '{node_type}'"),
            )
            .with_actual(json!(node_type)),
        ]);
    };

    let mut errors = Vec::new();
    for property in &descriptor.properties {
        check_property(property, parameters, &mut errors);
    }
    ValidationResult::from_errors(errors)
}

/// Validate a credentials map against the descriptor's declared credential
/// requirements. An unknown node type has no opinion and yields no errors.
pub fn validate_credentials(
    catalog: &dyn DescriptorCatalog,
    node_type: &str,
    credentials: &ParameterMap,
) -> Vec<ValidationError> {
    let Some(descriptor) = catalog.describe(node_type) else {
        return Vec::new();
    };
    missing_credential_slots(descriptor, credentials)
}

/// Validate parameters and credentials together.
pub fn validate_full(
    catalog: &dyn DescriptorCatalog,
    node_type: &str,
    parameters: &ParameterMap,
    credentials: &ParameterMap,
) -> ValidationResult {
    let mut result = validate(catalog, node_type, parameters);
    if let Some(descriptor) = catalog.describe(node_type) {
        result
            .errors
            .extend(missing_credential_slots(descriptor, credentials));
    }
    result.valid = result.errors.is_empty();
    result
}

fn missing_credential_slots(
    descriptor: &NodeTypeDescriptor,
    credentials: &ParameterMap,
) -> Vec<ValidationError> {
    descriptor
        .credentials
        .iter()
        .filter(|requirement| requirement.required)
        .filter(|requirement| is_missing(credentials.get(&requirement.name)))
        .map(|requirement| {
            ValidationError::new(
                &requirement.name,
                ValidationCode::MissingCredential,
                format!("required credential '{}' is not set", requirement.name),
            )
        })
        .collect()
}

fn check_property(
    property: &PropertyDescriptor,
    parameters: &ParameterMap,
    errors: &mut Vec<ValidationError>,
) {
    // A property hidden by its show/hide rules is never an error,
    // whether a value is present for it or not.
    if let Some(display) = &property.display_options {
        if !display.is_visible(parameters) {
            return;
        }
    }

    let value = parameters.get(&property.name);
    if is_missing(value) {
        if property.required {
            errors.push(ValidationError::new(
                &property.name,
                ValidationCode::MissingRequired,
                format!("required property '{}' is missing", property.name),
            ));
        }
        return;
    }
    let value = value.unwrap_or(&Value::Null);

    match &property.kind {
        PropertyKind::String => {
            if !value.is_string() {
                errors.push(type_error(property, "string", value));
            }
        }
        PropertyKind::Number => match value {
            Value::Number(number) if number.as_f64().is_some_and(f64::is_finite) => {
                check_range(property, number.as_f64().unwrap_or_default(), errors);
            }
            _ => errors.push(type_error(property, "number", value)),
        },
        PropertyKind::Boolean => {
            if !value.is_boolean() {
                errors.push(type_error(property, "boolean", value));
            }
        }
        PropertyKind::Options => {
            if !property.options.contains(value) {
                errors.push(
                    ValidationError::new(
                        &property.name,
                        ValidationCode::InvalidEnum,
                        format!(
                            "value for '{}' is not one of the allowed options",
                            property.name
                        ),
                    )
                    .with_expected(Value::Array(property.options.clone()))
                    .with_actual(value.clone()),
                );
            }
        }
        PropertyKind::MultiOptions => match value {
            Value::Array(elements) => {
                let invalid: Vec<Value> = elements
                    .iter()
                    .filter(|element| !property.options.contains(element))
                    .cloned()
                    .collect();
                if !invalid.is_empty() {
                    errors.push(
                        ValidationError::new(
                            &property.name,
                            ValidationCode::InvalidEnum,
                            format!(
                                "values for '{}' outside the allowed options",
                                property.name
                            ),
                        )
                        .with_expected(Value::Array(property.options.clone()))
                        .with_actual(Value::Array(invalid)),
                    );
                }
            }
            _ => errors.push(type_error(property, "array", value)),
        },
        PropertyKind::Credentials => {
            let present = value.as_str().is_some_and(|s| !s.is_empty());
            if !present {
                errors.push(ValidationError::new(
                    &property.name,
                    ValidationCode::MissingCredential,
                    format!("credential reference '{}' must be a non-empty string", property.name),
                ));
            }
        }
        PropertyKind::Collection | PropertyKind::FixedCollection => {
            if !(value.is_null() || value.is_object()) {
                errors.push(type_error(property, "object", value));
            }
        }
        PropertyKind::Hidden | PropertyKind::Notice => {}
        PropertyKind::Other(kind) => {
            // Forward-compatibility escape hatch: a newer catalog may
            // declare property kinds this engine does not know yet.
            tracing::debug!(
                property = %property.name,
                kind = %kind,
                "skipping validation of unrecognized property kind"
            );
        }
    }
}

fn check_range(property: &PropertyDescriptor, value: f64, errors: &mut Vec<ValidationError>) {
    let below = property.min.is_some_and(|min| value < min);
    let above = property.max.is_some_and(|max| value > max);
    if below || above {
        errors.push(
            ValidationError::new(
                &property.name,
                ValidationCode::InvalidRange,
                format!("value for '{}' is out of range", property.name),
            )
            .with_expected(json!({"min": property.min, "max": property.max}))
            .with_actual(json!(value)),
        );
    }
}

fn type_error(property: &PropertyDescriptor, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::new(
        &property.name,
        ValidationCode::InvalidType,
        format!("property '{}' must be a {expected}", property.name),
    )
    .with_expected(json!(expected))
    .with_actual(actual.clone())
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
