//! Backend storage format for configuration schemas
//!
//! The configuration service stores one entry per dot path (`"a.b.c"`), each holding
//! the leaf JSON Schema, a default value and a description.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One dot-path entry of the backend schema map
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: Value,
    pub schema: Value,
}

impl SchemaNode {
    pub fn new(schema: Value) -> Self {
        Self {
            description: String::new(),
            default_value: Value::Null,
            schema,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Dot path -> schema entry, ordered by path
pub type FlatSchemaMap = BTreeMap<String, SchemaNode>;

/// Request and response body of the properties-schema endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesPayload {
    #[serde(default)]
    pub properties: FlatSchemaMap,
}

impl From<FlatSchemaMap> for PropertiesPayload {
    fn from(properties: FlatSchemaMap) -> Self {
        Self { properties }
    }
}
