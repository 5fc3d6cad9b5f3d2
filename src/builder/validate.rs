//! Value validation against field schemas
//!
//! Validation never fails; it reports every violated constraint as a readable
//! message so the caller can show them next to the field.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::convert::kind_from_schema;
use super::generate::is_blank;
use super::tree::SchemaTree;
use crate::domain::{FieldId, FieldKind};

/// Outcome of validating one or more values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::from_errors(Vec::new())
    }
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// JSON type name of a value, with arrays told apart from objects
fn actual_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a value against a field kind.
///
/// `null` always passes: it means "not set".
pub fn validate_value(value: &Value, kind: &FieldKind) -> ValidationReport {
    let mut errors = Vec::new();
    if value.is_null() {
        return ValidationReport::from_errors(errors);
    }

    let expected = kind.field_type().as_str();
    let actual = actual_type(value);
    if expected != actual {
        errors.push(format!("Expected type {}, but got {}", expected, actual));
    }

    match (kind, value) {
        (FieldKind::String(c), Value::String(s)) => {
            let length = s.chars().count() as u64;
            if let Some(min) = c.min_length.filter(|min| length < *min) {
                errors.push(format!(
                    "String length {} is less than minimum {}",
                    length, min
                ));
            }
            if let Some(max) = c.max_length.filter(|max| length > *max) {
                errors.push(format!("String length {} exceeds maximum {}", length, max));
            }
            if let Some(pattern) = &c.pattern {
                match Regex::new(pattern) {
                    Ok(re) if !re.is_match(s) => {
                        errors.push(format!("String does not match pattern {}", pattern))
                    }
                    Ok(_) => {}
                    Err(e) => errors.push(format!("Invalid pattern {}: {}", pattern, e)),
                }
            }
            if !c.enum_values.is_empty() && !c.enum_values.iter().any(|v| v == s) {
                errors.push(format!(
                    "Value \"{}\" is not in allowed enum values: {}",
                    s,
                    c.enum_values.join(", ")
                ));
            }
        }
        (FieldKind::Number(c), Value::Number(n)) => {
            let number = n.as_f64().unwrap_or_default();
            if let Some(min) = &c.minimum {
                if number < min.as_f64().unwrap_or_default() {
                    errors.push(format!("Number {} is less than minimum {}", n, min));
                }
            }
            if let Some(max) = &c.maximum {
                if number > max.as_f64().unwrap_or_default() {
                    errors.push(format!("Number {} exceeds maximum {}", n, max));
                }
            }
        }
        _ => {}
    }

    ValidationReport::from_errors(errors)
}

/// Validate a value against a raw JSON Schema node.
///
/// A schema without `type` accepts anything; an unknown `type` is reported as an error.
pub fn validate_value_against_schema(value: &Value, schema: &Value) -> ValidationReport {
    if value.is_null() || schema.get("type").is_none() {
        return ValidationReport::default();
    }
    match kind_from_schema(schema, "") {
        Ok(kind) => validate_value(value, &kind),
        Err(e) => ValidationReport::from_errors(vec![e.to_string()]),
    }
}

/// Validate a dot-path value map against every field of the tree.
///
/// A required field whose value is missing, `null` or `""` yields exactly one
/// error; its children are still checked under their own paths. Other errors are
/// prefixed with the field's dot path.
pub fn validate_all_remote_config_values(
    values: &Map<String, Value>,
    tree: &SchemaTree,
) -> ValidationReport {
    let mut errors = Vec::new();
    for root in tree.roots() {
        validate_field(values, tree, root, "", &mut errors);
    }
    ValidationReport::from_errors(errors)
}

fn validate_field(
    values: &Map<String, Value>,
    tree: &SchemaTree,
    id: &FieldId,
    prefix: &str,
    errors: &mut Vec<String>,
) {
    let Some(field) = tree.get(id) else { return };
    let path = if prefix.is_empty() {
        field.name.clone()
    } else {
        format!("{}.{}", prefix, field.name)
    };
    let value = values.get(&path);

    if is_blank(value) {
        if field.required {
            errors.push(format!("{}: Required field is missing", path));
        }
    } else if let Some(value) = value {
        let report = validate_value(value, &field.kind);
        errors.extend(
            report
                .into_errors()
                .into_iter()
                .map(|e| format!("{}: {}", path, e)),
        );
    }

    for child in tree.children(id) {
        validate_field(values, tree, child, &path, errors);
    }
}
