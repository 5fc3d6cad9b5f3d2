pub mod schema_client;

pub use crate::domain::ClientError;
pub use schema_client::HttpSchemaStore;
