//! Schema field model
//!
//! A remote configuration schema is a forest of named, typed fields. Each field
//! carries its type-specific constraints inside [`FieldKind`], so a `pattern` on a
//! boolean or a `minimum` on a string cannot be expressed.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Opaque, stable identifier of a field within a tree.
///
/// Identifiers are random UUIDs, so they never repeat within or across sessions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(format!("field_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type tag of a field, as written in JSON Schema `type`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "array" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            other => Err(other.to_string()),
        }
    }
}

/// Element type of an array field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayItemType {
    String,
    Number,
    Boolean,
    Object,
}

impl ArrayItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayItemType::String => "string",
            ArrayItemType::Number => "number",
            ArrayItemType::Boolean => "boolean",
            ArrayItemType::Object => "object",
        }
    }
}

impl FromStr for ArrayItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ArrayItemType::String),
            "number" => Ok(ArrayItemType::Number),
            "boolean" => Ok(ArrayItemType::Boolean),
            "object" => Ok(ArrayItemType::Object),
            other => Err(other.to_string()),
        }
    }
}

/// Validation constraints of a string field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

/// Validation constraints of a number field.
///
/// Bounds keep the exact JSON number so `0` stays `0` and not `0.0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
}

/// Field type together with its type-specific constraints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    String(StringConstraints),
    Number(NumberConstraints),
    Boolean,
    Array {
        #[serde(rename = "arrayItemType", skip_serializing_if = "Option::is_none")]
        item_type: Option<ArrayItemType>,
    },
    Object,
}

impl Default for FieldKind {
    fn default() -> Self {
        FieldKind::String(StringConstraints::default())
    }
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::String(_) => FieldType::String,
            FieldKind::Number(_) => FieldType::Number,
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Array { .. } => FieldType::Array,
            FieldKind::Object => FieldType::Object,
        }
    }

    /// Only objects and arrays of objects may own child fields
    pub fn can_have_children(&self) -> bool {
        matches!(
            self,
            FieldKind::Object
                | FieldKind::Array {
                    item_type: Some(ArrayItemType::Object)
                }
        )
    }

    /// Unconstrained kind for a bare type tag
    pub fn plain(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => FieldKind::String(StringConstraints::default()),
            FieldType::Number => FieldKind::Number(NumberConstraints::default()),
            FieldType::Boolean => FieldKind::Boolean,
            FieldType::Array => FieldKind::Array { item_type: None },
            FieldType::Object => FieldKind::Object,
        }
    }
}

/// A node of the schema tree, without its children.
///
/// Parent/child links live in [`crate::builder::tree::SchemaTree`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub id: FieldId,
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl SchemaField {
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn can_have_children(&self) -> bool {
        self.kind.can_have_children()
    }
}

/// Operator input for creating or updating a field.
///
/// Blank descriptions and absent defaults are filled in when the draft is committed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}
