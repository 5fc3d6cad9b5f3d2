//! Domain types of the configuration schema builder

pub mod backend;
pub mod error;
pub mod field;
pub mod ports;

pub use backend::{FlatSchemaMap, PropertiesPayload, SchemaNode};
pub use error::ClientError;
pub use field::{
    ArrayItemType, FieldDraft, FieldId, FieldKind, FieldType, NumberConstraints, SchemaField,
    StringConstraints,
};
pub use ports::SchemaStore;
