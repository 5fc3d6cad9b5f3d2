//! Default value and description synthesis for fields the operator left blank

use serde_json::{json, Value};

use crate::domain::FieldKind;

/// Schema-compliant default for a field kind.
///
/// Strings take their first enum value, numbers their minimum, everything else
/// the empty value of its type.
pub fn generate_default_value(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String(c) => c
            .enum_values
            .first()
            .map(|v| Value::String(v.clone()))
            .unwrap_or_else(|| Value::String(String::new())),
        FieldKind::Number(c) => c
            .minimum
            .clone()
            .map(Value::Number)
            .unwrap_or_else(|| json!(0)),
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::Array { .. } => Value::Array(Vec::new()),
        FieldKind::Object => Value::Object(Default::default()),
    }
}

/// Human readable description from a camelCase or snake_case field name.
///
/// `maxRetryCount` becomes `Max Retry Count`, `cache_ttl` becomes `Cache ttl`.
pub fn generate_description(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            spaced.push(' ');
            spaced.push(ch);
        } else if ch == '_' {
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }

    // Capitalize before trimming: a leading separator leaves the word lowercase
    let mut chars = spaced.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    capitalized.trim().to_string()
}

/// True when a value counts as "not provided" for defaulting purposes
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}
