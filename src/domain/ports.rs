//! Ports to collaborators outside the schema builder core

use async_trait::async_trait;

use super::backend::FlatSchemaMap;
use super::error::ClientError;

/// Remote storage of the flat configuration schema
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Fetch the current schema map
    async fn fetch_properties(&self) -> Result<FlatSchemaMap, ClientError>;

    /// Replace the stored schema map, returning what the backend persisted
    async fn save_properties(&self, properties: &FlatSchemaMap) -> Result<FlatSchemaMap, ClientError>;
}
