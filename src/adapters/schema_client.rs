//! HTTP client for the configuration-schema endpoint
//!
//! The backend keeps one schema per organisation and application, selected with
//! the `x-organisation` and `x-application` headers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ApiSettings;
use crate::domain::{ClientError, FlatSchemaMap, PropertiesPayload, SchemaStore};

pub const SCHEMA_PATH: &str = "/organisations/applications/properties/schema";

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Http(format!("Connection error: {}", err))
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

/// [`SchemaStore`] backed by the configuration service's REST API
#[derive(Debug, Clone)]
pub struct HttpSchemaStore {
    client: Client,
    base_url: String,
    token: Option<String>,
    organisation: String,
    application: String,
}

impl HttpSchemaStore {
    pub fn new(api: &ApiSettings) -> Result<Self, ClientError> {
        let organisation = api
            .organisation
            .clone()
            .ok_or_else(|| ClientError::Config("api.organisation is not set".to_string()))?;
        let application = api
            .application
            .clone()
            .ok_or_else(|| ClientError::Config("api.application is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: api.token.clone().filter(|t| !t.is_empty()),
            organisation,
            application,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, SCHEMA_PATH)
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("x-organisation", &self.organisation)
            .header("x-application", &self.application);
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<PropertiesPayload, ClientError> {
        let response = self.with_headers(builder).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(PropertiesPayload::default());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SchemaStore for HttpSchemaStore {
    async fn fetch_properties(&self) -> Result<FlatSchemaMap, ClientError> {
        debug!("GET {}", self.endpoint());
        let payload = self.send(self.client.get(self.endpoint())).await?;
        info!(
            "Fetched {} schema entries for {}/{}",
            payload.properties.len(),
            self.organisation,
            self.application
        );
        Ok(payload.properties)
    }

    async fn save_properties(&self, properties: &FlatSchemaMap) -> Result<FlatSchemaMap, ClientError> {
        debug!("PUT {} ({} entries)", self.endpoint(), properties.len());
        let body = PropertiesPayload::from(properties.clone());
        let payload = self.send(self.client.put(self.endpoint()).json(&body)).await?;
        if payload.properties.is_empty() {
            return Ok(properties.clone());
        }
        Ok(payload.properties)
    }
}
