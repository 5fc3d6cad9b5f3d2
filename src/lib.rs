//! # Airborne Schema - Remote Configuration Schema Builder
//!
//! Builds and edits the JSON Schema that describes an Airborne application's
//! remote configuration. The configuration service stores the schema as a flat
//! map of dot paths (`"network.retry.count"`) to leaf schemas; operators edit it
//! as a tree of typed fields.
//!
//! ## Features
//!
//! - **Field tree**: add, update, delete, move and reorder fields with cycle checks
//! - **Conversions**: flat map, field tree and JSON Schema (draft 2020-12) documents
//! - **Validation**: per-value and whole-config validation with readable messages
//! - **Drag and drop**: a testable state machine for tree editors
//! - **Backend client**: fetch and save schemas over the service's REST API
//!
//! ## Quick Start
//!
//! ```rust
//! use airborne_schema::builder::{flat_to_tree, schema_to_flat, tree_to_schema};
//! use airborne_schema::domain::{FlatSchemaMap, SchemaNode};
//! use serde_json::json;
//!
//! let mut flat = FlatSchemaMap::new();
//! flat.insert(
//!     "a.b".to_string(),
//!     SchemaNode::new(json!({"type": "number", "minimum": 0})).with_default(json!(5)),
//! );
//!
//! let tree = flat_to_tree(&flat).unwrap();
//! let schema = tree_to_schema(&tree);
//! assert_eq!(schema["properties"]["a"]["type"], "object");
//! assert!(schema_to_flat(&schema).contains_key("a.b"));
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: field model, backend storage format and ports
//! - **Builder**: the synchronous schema-builder core
//! - **Adapters**: the HTTP client for the configuration service
//! - **Config**: configuration management

pub mod adapters;
pub mod builder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
