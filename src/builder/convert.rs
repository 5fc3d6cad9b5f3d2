//! Conversions between the backend flat map, the field tree and JSON Schema
//!
//! ```text
//! FlatSchemaMap --flat_to_tree--> SchemaTree --tree_to_schema--> JSON Schema
//!      ^                                                              |
//!      +------------------------ schema_to_flat ----------------------+
//! ```
//!
//! `schema_to_tree` is the inverse of `tree_to_schema` and backs JSON import.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

use super::generate::{generate_default_value, generate_description, is_blank};
use super::tree::SchemaTree;
use super::validate::validate_value_against_schema;
use crate::domain::{
    ArrayItemType, FieldId, FieldKind, FieldType, FlatSchemaMap, NumberConstraints, SchemaField,
    SchemaNode, StringConstraints,
};

pub const SCHEMA_DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";
pub const SCHEMA_ID: &str = "https://example.com/remote-config.schema.json";
pub const SCHEMA_TITLE: &str = "Remote Configuration Schema";
pub const SCHEMA_DESCRIPTION: &str = "Schema for remote configuration values";

/// Errors raised while reading schema documents
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid JSON schema format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unsupported type '{found}' at '{path}'")]
    UnsupportedType { path: String, found: String },

    #[error("Expected a JSON object at '{0}'")]
    NotAnObject(String),
}

/// Read the field kind described by one JSON Schema node.
///
/// A node without `type` is treated as a string, like the backend does.
pub fn kind_from_schema(schema: &Value, path: &str) -> Result<FieldKind, SchemaError> {
    let unsupported = |found: String| SchemaError::UnsupportedType {
        path: path.to_string(),
        found,
    };

    let field_type = match schema.get("type") {
        None | Some(Value::Null) => FieldType::String,
        Some(Value::String(s)) => s.parse::<FieldType>().map_err(unsupported)?,
        Some(other) => return Err(unsupported(other.to_string())),
    };

    let kind = match field_type {
        FieldType::String => FieldKind::String(StringConstraints {
            min_length: schema.get("minLength").and_then(Value::as_u64),
            max_length: schema.get("maxLength").and_then(Value::as_u64),
            pattern: schema
                .get("pattern")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            enum_values: schema
                .get("enum")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        }),
        FieldType::Number => FieldKind::Number(NumberConstraints {
            minimum: as_number(schema.get("minimum")),
            maximum: as_number(schema.get("maximum")),
        }),
        FieldType::Boolean => FieldKind::Boolean,
        FieldType::Array => {
            let item_type = match schema.get("items").and_then(|items| items.get("type")) {
                Some(Value::String(s)) => {
                    Some(s.parse::<ArrayItemType>().map_err(unsupported)?)
                }
                Some(other) => return Err(unsupported(other.to_string())),
                None => None,
            };
            FieldKind::Array { item_type }
        }
        FieldType::Object => FieldKind::Object,
    };
    Ok(kind)
}

fn as_number(value: Option<&Value>) -> Option<serde_json::Number> {
    match value {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// The JSON Schema node that holds the children of a container field
fn children_source<'a>(kind: &FieldKind, schema: &'a Value) -> Option<&'a Value> {
    match kind {
        FieldKind::Object => Some(schema),
        FieldKind::Array {
            item_type: Some(ArrayItemType::Object),
        } => schema.get("items"),
        _ => None,
    }
}

fn required_names(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Input for building one field (and its subtree) from a JSON Schema node
struct FieldSource<'a> {
    name: &'a str,
    path: String,
    schema: &'a Value,
    required: bool,
    description: Option<String>,
    default_value: Option<Value>,
}

/// Builds tree fields from JSON Schema nodes.
///
/// With `synthesize` set, blank descriptions and defaults are generated.
struct FieldBuilder<'t> {
    tree: &'t mut SchemaTree,
    synthesize: bool,
}

impl FieldBuilder<'_> {
    fn build(&mut self, parent: Option<&FieldId>, source: FieldSource<'_>) -> Result<FieldId, SchemaError> {
        let kind = kind_from_schema(source.schema, &source.path)?;

        let description = source
            .description
            .filter(|d| !d.trim().is_empty())
            .or_else(|| {
                source
                    .schema
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default();
        let default_value = source
            .default_value
            .filter(|v| !v.is_null())
            .or_else(|| source.schema.get("default").cloned());

        let field = SchemaField {
            id: FieldId::generate(),
            name: source.name.to_string(),
            description: if self.synthesize && description.trim().is_empty() {
                generate_description(source.name)
            } else {
                description
            },
            default_value: if self.synthesize && is_blank(default_value.as_ref()) {
                Some(generate_default_value(&kind))
            } else {
                default_value
            },
            required: source.required,
            kind,
        };

        let children = children_source(&field.kind, source.schema);
        let id = self
            .tree
            .insert(parent, field)
            .map_err(|_| SchemaError::NotAnObject(source.path.clone()))?;

        if let Some(container) = children {
            self.build_properties(Some(&id), container, &source.path)?;
        }
        Ok(id)
    }

    fn build_properties(
        &mut self,
        parent: Option<&FieldId>,
        container: &Value,
        path: &str,
    ) -> Result<(), SchemaError> {
        let Some(properties) = container.get("properties") else {
            return Ok(());
        };
        let properties = properties
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject(join_path(path, "properties")))?;
        let required = required_names(container);

        for (name, schema) in properties {
            self.build(
                parent,
                FieldSource {
                    name,
                    path: join_path(path, name),
                    schema,
                    required: required.contains(&name.as_str()),
                    description: None,
                    default_value: None,
                },
            )?;
        }
        Ok(())
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Build the field tree from the backend's dot-path map.
///
/// Paths are processed in sorted order; every missing ancestor segment becomes a
/// synthesized object field. Leaves get their description and default from the
/// entry, falling back to generated ones.
pub fn flat_to_tree(flat: &FlatSchemaMap) -> Result<SchemaTree, SchemaError> {
    let mut tree = SchemaTree::new();
    let mut by_path: HashMap<String, FieldId> = HashMap::new();

    'entries: for (key, node) in flat {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            warn!("Skipping schema entry with empty path segment: '{}'", key);
            continue;
        }
        let Some((leaf_name, ancestors)) = segments.split_last() else {
            continue;
        };

        let mut parent: Option<FieldId> = None;
        let mut prefix = String::new();
        for segment in ancestors {
            prefix = join_path(&prefix, segment);
            let id = match by_path.get(&prefix) {
                Some(existing) => existing.clone(),
                None => {
                    let synthesized = SchemaField {
                        id: FieldId::generate(),
                        name: segment.to_string(),
                        kind: FieldKind::Object,
                        description: generate_description(segment),
                        required: false,
                        default_value: Some(Value::Object(Map::new())),
                    };
                    let id = tree
                        .insert(parent.as_ref(), synthesized)
                        .map_err(|_| SchemaError::NotAnObject(prefix.clone()))?;
                    by_path.insert(prefix.clone(), id.clone());
                    id
                }
            };
            if !tree.get(&id).is_some_and(SchemaField::can_have_children) {
                warn!(
                    "Skipping schema entry '{}': '{}' is not an object field",
                    key, prefix
                );
                continue 'entries;
            }
            parent = Some(id);
        }

        let mut builder = FieldBuilder {
            tree: &mut tree,
            synthesize: true,
        };
        let id = builder.build(
            parent.as_ref(),
            FieldSource {
                name: leaf_name,
                path: key.clone(),
                schema: &node.schema,
                required: false,
                description: Some(node.description.clone()),
                default_value: Some(node.default_value.clone()),
            },
        )?;
        by_path.insert(key.clone(), id);
    }

    debug!("Built schema tree with {} fields from {} entries", tree.len(), flat.len());
    Ok(tree)
}

/// JSON Schema node for a single field and its subtree
fn field_schema(tree: &SchemaTree, id: &FieldId) -> Value {
    let mut schema = Map::new();
    let Some(field) = tree.get(id) else {
        return Value::Object(schema);
    };
    schema.insert("type".into(), json!(field.field_type().as_str()));

    match &field.kind {
        FieldKind::String(c) => {
            if let Some(min) = c.min_length {
                schema.insert("minLength".into(), json!(min));
            }
            if let Some(max) = c.max_length {
                schema.insert("maxLength".into(), json!(max));
            }
            if let Some(pattern) = &c.pattern {
                schema.insert("pattern".into(), json!(pattern));
            }
            if !c.enum_values.is_empty() {
                schema.insert("enum".into(), json!(c.enum_values));
            }
        }
        FieldKind::Number(c) => {
            if let Some(min) = &c.minimum {
                schema.insert("minimum".into(), Value::Number(min.clone()));
            }
            if let Some(max) = &c.maximum {
                schema.insert("maximum".into(), Value::Number(max.clone()));
            }
        }
        FieldKind::Boolean => {}
        FieldKind::Array { item_type } => match item_type {
            Some(ArrayItemType::Object) => {
                schema.insert("items".into(), object_schema(tree, tree.children(id)));
            }
            Some(other) => {
                schema.insert("items".into(), json!({ "type": other.as_str() }));
            }
            None => {}
        },
        FieldKind::Object => {
            let children = tree.children(id);
            if children.is_empty() {
                schema.insert("additionalProperties".into(), Value::Bool(true));
            } else {
                let (properties, required) = properties_of(tree, children);
                schema.insert("properties".into(), Value::Object(properties));
                if !required.is_empty() {
                    schema.insert("required".into(), json!(required));
                }
            }
        }
    }

    if !field.description.is_empty() {
        schema.insert("description".into(), json!(field.description));
    }
    if let Some(default) = &field.default_value {
        schema.insert("default".into(), default.clone());
    }
    Value::Object(schema)
}

fn properties_of(tree: &SchemaTree, ids: &[FieldId]) -> (Map<String, Value>, Vec<String>) {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for id in ids {
        let Some(field) = tree.get(id) else { continue };
        if field.required {
            required.push(field.name.clone());
        }
        properties.insert(field.name.clone(), field_schema(tree, id));
    }
    (properties, required)
}

fn object_schema(tree: &SchemaTree, ids: &[FieldId]) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    if !ids.is_empty() {
        let (properties, required) = properties_of(tree, ids);
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
    }
    Value::Object(schema)
}

/// Render the tree as a JSON Schema (draft 2020-12) document.
///
/// Property order follows child order.
pub fn tree_to_schema(tree: &SchemaTree) -> Value {
    let (properties, required) = properties_of(tree, tree.roots());

    let mut doc = Map::new();
    doc.insert("$schema".into(), json!(SCHEMA_DRAFT));
    doc.insert("$id".into(), json!(SCHEMA_ID));
    doc.insert("title".into(), json!(SCHEMA_TITLE));
    doc.insert("description".into(), json!(SCHEMA_DESCRIPTION));
    doc.insert("type".into(), json!("object"));
    doc.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        doc.insert("required".into(), json!(required));
    }
    doc.insert("additionalProperties".into(), Value::Bool(false));
    Value::Object(doc)
}

/// Rebuild a field tree from a JSON Schema document.
///
/// Field ids are freshly generated; descriptions and defaults are taken as written.
pub fn schema_to_tree(schema: &Value) -> Result<SchemaTree, SchemaError> {
    if !schema.is_object() {
        return Err(SchemaError::NotAnObject("$".to_string()));
    }
    let mut tree = SchemaTree::new();
    FieldBuilder {
        tree: &mut tree,
        synthesize: false,
    }
    .build_properties(None, schema, "")?;
    Ok(tree)
}

fn is_nested_object(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
        && schema.get("properties").is_some_and(Value::is_object)
}

fn without_description(schema: &Value) -> Value {
    let mut cleaned = schema.clone();
    if let Some(map) = cleaned.as_object_mut() {
        map.remove("description");
    }
    cleaned
}

fn flatten_into(schema: &Value, path: &str, out: &mut BTreeMap<String, Value>) {
    if !is_nested_object(schema) {
        out.insert(path.to_string(), without_description(schema));
        return;
    }
    // Objects with properties never become entries of their own; only their
    // non-object properties do, at the accumulated path.
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            flatten_into(property, &join_path(path, name), out);
        }
    }
}

/// Flatten a JSON Schema document into dot path -> leaf schema.
///
/// Descriptions are stripped from the emitted leaf schemas.
pub fn schema_to_flat(schema: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            flatten_into(property, name, &mut out);
        }
    }
    out
}

/// Backend payload built from a tree, plus the defaults that had to be replaced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendExport {
    pub properties: FlatSchemaMap,
    pub warnings: Vec<String>,
}

/// Produce the backend storage map for a tree.
///
/// Every entry gets a non-empty description and a default value that satisfies
/// its schema; defaults that fail validation are regenerated and reported in
/// `warnings`.
pub fn tree_to_backend(tree: &SchemaTree) -> BackendExport {
    let flat = schema_to_flat(&tree_to_schema(tree));
    let mut export = BackendExport::default();

    for (path, mut leaf_schema) in flat {
        let field = tree.find_by_path(&path).and_then(|id| tree.get(id));
        let (kind, name, explicit_default, description) = match field {
            Some(field) => (
                Some(field.kind.clone()),
                field.name.clone(),
                field.default_value.clone().filter(|v| !v.is_null()),
                field.description.clone(),
            ),
            None => (
                kind_from_schema(&leaf_schema, &path).ok(),
                path.rsplit('.').next().unwrap_or(&path).to_string(),
                None,
                String::new(),
            ),
        };
        let generated = kind.as_ref().map(generate_default_value).unwrap_or(Value::Null);

        let mut default_value = explicit_default.unwrap_or_else(|| generated.clone());
        let report = validate_value_against_schema(&default_value, &leaf_schema);
        if !report.is_valid() {
            let message = format!("Field \"{}\": {}", name, report.errors().join(", "));
            warn!("Replacing invalid default at '{}': {}", path, message);
            export.warnings.push(message);
            default_value = generated;
        }
        if let Some(map) = leaf_schema.as_object_mut() {
            map.insert("default".into(), default_value.clone());
        }

        let description = if description.trim().is_empty() {
            generate_description(&name)
        } else {
            description
        };

        export.properties.insert(
            path,
            SchemaNode {
                description,
                default_value,
                schema: leaf_schema,
            },
        );
    }
    export
}

/// Expand a dot-path value map into a nested JSON object.
///
/// A later path replaces a non-object value sitting on one of its ancestor segments.
pub fn dotted_to_nested(values: &Map<String, Value>) -> Value {
    let mut root = Map::new();
    for (key, value) in values {
        let segments: Vec<&str> = key.split('.').collect();
        let Some((last, ancestors)) = segments.split_last() else {
            continue;
        };
        let mut current = &mut root;
        for segment in ancestors {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made an object"),
            };
        }
        current.insert(last.to_string(), value.clone());
    }
    Value::Object(root)
}
