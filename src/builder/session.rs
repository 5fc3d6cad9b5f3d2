//! Editing session around a single schema tree
//!
//! The session owns the tree for as long as the operator edits it: it remembers
//! what was loaded so it can tell whether anything changed, handles JSON Schema
//! import/export, routes drag gestures and produces the payload to save.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::convert::{flat_to_tree, schema_to_tree, tree_to_backend, tree_to_schema, BackendExport, SchemaError};
use super::drag::{DragController, DropOutcome, DropTarget};
use super::tree::SchemaTree;
use super::validate::{validate_all_remote_config_values, ValidationReport};
use crate::domain::{ClientError, FieldId, FlatSchemaMap, SchemaStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Clone, Default)]
pub struct SchemaBuilderSession {
    tree: SchemaTree,
    baseline: String,
    drag: DragController,
    json_error: Option<String>,
}

fn snapshot(tree: &SchemaTree) -> String {
    serde_json::to_string(tree).unwrap_or_default()
}

impl SchemaBuilderSession {
    pub fn empty() -> Self {
        Self::with_tree(SchemaTree::new())
    }

    /// Start a session from a tree, taking it as the saved state
    pub fn with_tree(tree: SchemaTree) -> Self {
        let baseline = snapshot(&tree);
        Self {
            tree,
            baseline,
            drag: DragController::new(),
            json_error: None,
        }
    }

    /// Start a session from the backend's flat map
    pub fn from_properties(properties: &FlatSchemaMap) -> Result<Self, SchemaError> {
        Ok(Self::with_tree(flat_to_tree(properties)?))
    }

    /// Fetch the schema from the store and start a session on it
    pub async fn load(store: &dyn SchemaStore) -> Result<Self, SessionError> {
        let properties = store.fetch_properties().await?;
        info!("Loaded {} schema entries", properties.len());
        Ok(Self::from_properties(&properties)?)
    }

    /// Like [`Self::load`], falling back to an empty tree when loading fails
    pub async fn load_or_empty(store: &dyn SchemaStore) -> Self {
        match Self::load(store).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to load configuration schema: {}", e);
                Self::empty()
            }
        }
    }

    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SchemaTree {
        &mut self.tree
    }

    /// True when the tree differs from what was loaded or last saved
    pub fn has_changes(&self) -> bool {
        snapshot(&self.tree) != self.baseline
    }

    pub fn mark_saved(&mut self) {
        self.baseline = snapshot(&self.tree);
    }

    /// The tree as a pretty-printed JSON Schema document
    pub fn export_json_schema(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(&tree_to_schema(&self.tree))?)
    }

    /// Replace the tree with the fields of a JSON Schema document.
    ///
    /// On failure the tree is left as it was and the message is kept in [`Self::json_error`].
    pub fn import_json_schema(&mut self, text: &str) -> Result<(), SchemaError> {
        let imported = serde_json::from_str::<Value>(text)
            .map_err(SchemaError::from)
            .and_then(|doc| schema_to_tree(&doc));

        match imported {
            Ok(tree) => {
                info!("Imported JSON schema with {} fields", tree.len());
                self.tree = tree;
                self.json_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("JSON schema import failed: {}", e);
                self.json_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Last import failure, cleared by the next successful import
    pub fn json_error(&self) -> Option<&str> {
        self.json_error.as_deref()
    }

    /// Backend payload for the current tree
    pub fn submission(&self) -> BackendExport {
        tree_to_backend(&self.tree)
    }

    pub fn validate_values(&self, values: &Map<String, Value>) -> ValidationReport {
        validate_all_remote_config_values(values, &self.tree)
    }

    /// Push the current tree to the store; the session stays dirty on failure
    pub async fn save(&mut self, store: &dyn SchemaStore) -> Result<BackendExport, SessionError> {
        let export = self.submission();
        for warning in &export.warnings {
            warn!("{}", warning);
        }
        let saved = store.save_properties(&export.properties).await?;
        info!("Saved {} schema entries", saved.len());
        self.mark_saved();
        Ok(export)
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn drag_start(&mut self, source: FieldId) {
        self.drag.start(source);
    }

    pub fn drag_over(&mut self, hits: &[DropTarget]) -> bool {
        self.drag.over(&self.tree, hits)
    }

    pub fn drag_drop(&mut self) -> DropOutcome {
        self.drag.drop(&mut self.tree)
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }
}
