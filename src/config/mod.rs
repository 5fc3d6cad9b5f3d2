use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "airborne-schema.toml";
pub const ENV_PREFIX: &str = "AIRBORNE_SCHEMA";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

/// Connection to the configuration service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    pub base_url: String,
    /// Bearer token; requests are sent unauthenticated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Settings {
    /// Load settings from the file at `path` (if it exists) and the environment
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("api.base_url", "http://localhost:8081")?
            .set_default("api.timeout_seconds", 30)?
            .set_default("logging.level", "info")?
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings)
    }

    /// Create settings from CLI arguments (config file, then env vars, then CLI flags)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;
        settings.apply_cli_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(token) = &cli.token {
            self.api.token = Some(token.clone());
        }
        if let Some(organisation) = &cli.organisation {
            self.api.organisation = Some(organisation.clone());
        }
        if let Some(application) = &cli.application {
            self.api.application = Some(application.clone());
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(validation_failed)
    }

    /// Validation for commands that talk to the configuration service
    pub fn validate_remote(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate_remote(self).map_err(validation_failed)
    }
}

fn validation_failed(errors: Vec<validator::ConfigError>) -> anyhow::Error {
    let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow::anyhow!(
        "Configuration validation failed:\n{}",
        error_messages.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:8081");
        assert_eq!(settings.api.timeout_seconds, 30);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.api.token.is_none());
    }

    #[test]
    fn test_file_values() {
        let file = config_file(
            r#"
[api]
base_url = "https://config.example.com"
organisation = "acme"
application = "shop"
timeout_seconds = 5

[logging]
level = "debug"
"#,
        );
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.api.base_url, "https://config.example.com");
        assert_eq!(settings.api.organisation.as_deref(), Some("acme"));
        assert_eq!(settings.api.timeout_seconds, 5);
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.validate_remote().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = config_file("[api]\norganisation = \"acme\"\n");
        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from([
            "airborne-schema",
            "--config",
            path.as_str(),
            "--organisation",
            "other",
            "--application",
            "shop",
            "--log-level",
            "warn",
            "tree",
            "schema.json",
        ]);
        let settings = Settings::new_with_cli(&cli).unwrap();
        assert_eq!(settings.api.organisation.as_deref(), Some("other"));
        assert_eq!(settings.api.application.as_deref(), Some("shop"));
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let file = config_file("[api]\nbase_url = \"\"\ntimeout_seconds = 0\n");
        let settings = Settings::load(file.path()).unwrap();
        let err = settings.validate().unwrap_err().to_string();
        assert!(err.starts_with("Configuration validation failed"));
        assert!(err.contains("api.base_url"));
        assert!(err.contains("api.timeout_seconds"));
    }
}
