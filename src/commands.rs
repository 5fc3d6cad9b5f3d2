//! Command implementations behind the `airborne-schema` binary
//!
//! Input files are JSON or YAML (chosen by extension) and may hold either the
//! backend's flat map or a JSON Schema document; [`detect_input`] tells them apart.

use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::adapters::schema_client::HttpSchemaStore;
use crate::builder::{
    flat_to_tree, schema_to_tree, tree_to_schema, SchemaBuilderSession, SchemaError, SchemaTree,
};
use crate::cli::Command;
use crate::config::Settings;
use crate::domain::{FieldKind, FlatSchemaMap, PropertiesPayload};

/// A schema file, as recognised from its content
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaInput {
    Flat(FlatSchemaMap),
    Schema(Value),
}

impl SchemaInput {
    pub fn into_tree(self) -> Result<SchemaTree, SchemaError> {
        match self {
            SchemaInput::Flat(flat) => flat_to_tree(&flat),
            SchemaInput::Schema(schema) => schema_to_tree(&schema),
        }
    }
}

/// Parse a JSON or YAML file into a JSON value
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let value = if matches!(ext, "yaml" | "yml") {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content).map_err(SchemaError::from)?
    };
    Ok(value)
}

fn looks_like_flat(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map
            .values()
            .all(|entry| entry.as_object().is_some_and(|e| e.contains_key("schema")))
}

/// Decide whether a document is a flat backend map (bare or wrapped in
/// `{"properties": ...}`) or a JSON Schema document.
pub fn detect_input(doc: Value) -> Result<SchemaInput, SchemaError> {
    let Value::Object(map) = doc else {
        return Err(SchemaError::NotAnObject("$".to_string()));
    };

    if let Some(Value::Object(properties)) = map.get("properties") {
        if map.len() == 1 && looks_like_flat(properties) {
            let flat = serde_json::from_value(Value::Object(properties.clone()))?;
            return Ok(SchemaInput::Flat(flat));
        }
        return Ok(SchemaInput::Schema(Value::Object(map)));
    }
    if looks_like_flat(&map) {
        return Ok(SchemaInput::Flat(serde_json::from_value(Value::Object(map))?));
    }
    Ok(SchemaInput::Schema(Value::Object(map)))
}

pub fn load_tree(path: &Path) -> anyhow::Result<SchemaTree> {
    let input = detect_input(read_document(path)?)?;
    Ok(input.into_tree()?)
}

fn type_label(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Array {
            item_type: Some(item),
        } => format!("array<{}>", item.as_str()),
        other => other.field_type().to_string(),
    }
}

/// Indented outline of the tree, one field per line; required fields end in `*`
pub fn render_outline(tree: &SchemaTree) -> String {
    fn walk(tree: &SchemaTree, ids: &[crate::domain::FieldId], depth: usize, out: &mut String) {
        for id in ids {
            let Some(field) = tree.get(id) else { continue };
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{}: {}", field.name, type_label(&field.kind)));
            if field.required {
                out.push('*');
            }
            out.push('\n');
            walk(tree, tree.children(id), depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(tree, tree.roots(), 0, &mut out);
    out
}

fn write_json<W: Write + ?Sized>(out: &mut W, value: &impl serde::Serialize) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Run one command, writing its result to `out`
pub async fn execute<W: Write + ?Sized>(
    command: &Command,
    settings: &Settings,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::ToSchema { flat_file } => {
            let tree = load_tree(flat_file)?;
            write_json(out, &tree_to_schema(&tree))?;
        }
        Command::ToFlat { schema_file } => {
            let session = SchemaBuilderSession::with_tree(load_tree(schema_file)?);
            let export = session.submission();
            for warning in &export.warnings {
                warn!("{}", warning);
            }
            write_json(out, &PropertiesPayload::from(export.properties))?;
        }
        Command::Tree { file } => {
            let tree = load_tree(file)?;
            write!(out, "{}", render_outline(&tree))?;
        }
        Command::Validate { schema, values } => {
            let session = SchemaBuilderSession::with_tree(load_tree(schema)?);
            let Value::Object(values) = read_document(values)? else {
                bail!("Values file must contain a JSON object");
            };
            let report = session.validate_values(&values);
            if !report.is_valid() {
                for error in report.errors() {
                    writeln!(out, "{}", error)?;
                }
                bail!("{} validation error(s)", report.errors().len());
            }
            writeln!(out, "All values are valid")?;
        }
        Command::Pull { output } => {
            let store = HttpSchemaStore::new(&settings.api)?;
            let session = SchemaBuilderSession::load(&store).await?;
            let text = session.export_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(path, format!("{}\n", text))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote JSON schema to {}", path.display());
                }
                None => writeln!(out, "{}", text)?,
            }
        }
        Command::Push {
            schema_file,
            dry_run,
        } => {
            let mut session = SchemaBuilderSession::with_tree(load_tree(schema_file)?);
            if *dry_run {
                let export = session.submission();
                for warning in &export.warnings {
                    warn!("{}", warning);
                }
                write_json(out, &PropertiesPayload::from(export.properties))?;
            } else {
                let store = HttpSchemaStore::new(&settings.api)?;
                let export = session.save(&store).await?;
                writeln!(out, "Saved {} schema entries", export.properties.len())?;
            }
        }
    }
    Ok(())
}
