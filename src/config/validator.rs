use thiserror::Error;

use crate::config::{ApiSettings, LoggingSettings, Settings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_api(&settings.api) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_logging(&settings.logging) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Everything in [`Self::validate`] plus the service coordinates
    pub fn validate_remote(settings: &Settings) -> Result<(), Vec<ConfigError>> {
        let mut errors = match Self::validate(settings) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        let missing = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
        if missing(&settings.api.organisation) {
            errors.push(ConfigError::MissingField("api.organisation".to_string()));
        }
        if missing(&settings.api.application) {
            errors.push(ConfigError::MissingField("api.application".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_api(api: &ApiSettings) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if api.base_url.trim().is_empty() {
            errors.push(ConfigError::MissingField("api.base_url".to_string()));
        } else if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
            errors.push(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        if api.timeout_seconds == 0 {
            errors.push(ConfigError::InvalidValue {
                field: "api.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_logging(logging: &LoggingSettings) -> Result<(), Vec<ConfigError>> {
        if logging.level.trim().is_empty() {
            return Err(vec![ConfigError::MissingField("logging.level".to_string())]);
        }
        Ok(())
    }
}
