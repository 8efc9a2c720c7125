//! Validation of parsed JSON against a [`Schema`].

use serde_json::Value;

use crate::schema::{FieldType, Schema};

/// Why a value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error("missing required field")]
    Missing,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected at least {min} items, found {len}")]
    TooShort { min: usize, len: usize },

    #[error("expected at most {max} items, found {len}")]
    TooLong { max: usize, len: usize },
}

/// The first validation failure, located by field path.
///
/// Paths use dotted field names with bracketed indices, e.g. `products[2].price`.
/// A failure at the top level uses `$`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    fn new(path: &str, kind: ValidationErrorKind) -> Self {
        let path = if path.is_empty() { "$" } else { path };
        Self {
            path: path.to_string(),
            kind,
        }
    }
}

/// Validate `value` against `schema`, reporting the first failing field.
///
/// Fields are checked in declaration order, depth first. Extra fields not named
/// by the schema are ignored.
pub fn validate(value: &Value, schema: &Schema) -> Result<(), ValidationError> {
    validate_record(value, schema, "")
}

fn validate_record(value: &Value, schema: &Schema, path: &str) -> Result<(), ValidationError> {
    let Some(object) = value.as_object() else {
        return Err(ValidationError::new(
            path,
            ValidationErrorKind::TypeMismatch {
                expected: "object",
                found: json_kind(value),
            },
        ));
    };

    for field in schema.fields() {
        let field_path = if path.is_empty() {
            field.name().to_string()
        } else {
            format!("{}.{}", path, field.name())
        };

        match object.get(field.name()) {
            None | Some(Value::Null) if !field.is_required() => continue,
            None => {
                return Err(ValidationError::new(
                    &field_path,
                    ValidationErrorKind::Missing,
                ))
            }
            Some(v) => validate_value(v, field.field_type(), &field_path)?,
        }
    }

    Ok(())
}

fn validate_value(value: &Value, field_type: &FieldType, path: &str) -> Result<(), ValidationError> {
    let matches = match field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Record(schema) => return validate_record(value, schema, path),
        FieldType::Sequence { item, min, max } => {
            return validate_sequence(value, item, *min, *max, path)
        }
    };

    if matches {
        Ok(())
    } else {
        Err(ValidationError::new(
            path,
            ValidationErrorKind::TypeMismatch {
                expected: field_type.json_name(),
                found: json_kind(value),
            },
        ))
    }
}

fn validate_sequence(
    value: &Value,
    item: &FieldType,
    min: usize,
    max: Option<usize>,
    path: &str,
) -> Result<(), ValidationError> {
    let Some(items) = value.as_array() else {
        return Err(ValidationError::new(
            path,
            ValidationErrorKind::TypeMismatch {
                expected: "array",
                found: json_kind(value),
            },
        ));
    };

    let len = items.len();
    if len < min {
        return Err(ValidationError::new(
            path,
            ValidationErrorKind::TooShort { min, len },
        ));
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::new(
                path,
                ValidationErrorKind::TooLong { max, len },
            ));
        }
    }

    for (index, element) in items.iter().enumerate() {
        validate_value(element, item, &format!("{}[{}]", path, index))?;
    }

    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
