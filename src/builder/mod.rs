//! Schema builder core
//!
//! - [`tree`]: the field forest and its structural operations
//! - [`convert`]: flat map / tree / JSON Schema conversions
//! - [`generate`]: default values and descriptions for blank fields
//! - [`validate`]: value validation
//! - [`drag`]: drag-and-drop interpretation
//! - [`session`]: one editing session over a tree

pub mod convert;
pub mod drag;
pub mod generate;
pub mod session;
pub mod tree;
pub mod validate;

pub use convert::{
    dotted_to_nested, flat_to_tree, schema_to_flat, schema_to_tree, tree_to_backend,
    tree_to_schema, BackendExport, SchemaError,
};
pub use drag::{DragController, DragState, DropOutcome, DropTarget};
pub use generate::{generate_default_value, generate_description};
pub use session::{SchemaBuilderSession, SessionError};
pub use tree::{SchemaTree, TreeError};
pub use validate::{
    validate_all_remote_config_values, validate_value, validate_value_against_schema,
    ValidationReport,
};
