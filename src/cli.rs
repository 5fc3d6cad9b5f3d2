use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Remote configuration schema builder for Airborne applications
#[derive(Parser, Debug, Clone)]
#[command(name = "airborne-schema", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "AIRBORNE_SCHEMA_CONFIG", default_value = crate::config::DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Log level or tracing filter directive (overrides the configured level)
    #[arg(long, env = "AIRBORNE_SCHEMA_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Base URL of the configuration service
    #[arg(long, env = "AIRBORNE_SCHEMA_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token for the configuration service
    #[arg(long, env = "AIRBORNE_SCHEMA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Organisation the schema belongs to
    #[arg(long, env = "AIRBORNE_SCHEMA_ORGANISATION", global = true)]
    pub organisation: Option<String>,

    /// Application the schema belongs to
    #[arg(long, env = "AIRBORNE_SCHEMA_APPLICATION", global = true)]
    pub application: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Convert a flat backend map into a JSON Schema document
    ToSchema {
        /// Flat map file (JSON or YAML)
        flat_file: PathBuf,
    },

    /// Convert a JSON Schema document into the backend payload
    ToFlat {
        /// JSON Schema file (JSON or YAML)
        schema_file: PathBuf,
    },

    /// Print the field tree of a flat map or JSON Schema file
    Tree {
        file: PathBuf,
    },

    /// Validate a dot-path value map against a schema
    Validate {
        /// Flat map or JSON Schema file
        #[arg(long)]
        schema: PathBuf,

        /// Values file mapping dot paths to values
        #[arg(long)]
        values: PathBuf,
    },

    /// Fetch the schema from the configuration service
    Pull {
        /// Write the JSON Schema document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a JSON Schema document to the configuration service
    Push {
        schema_file: PathBuf,

        /// Print the payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

impl Command {
    /// Whether the command talks to the configuration service
    pub fn is_remote(&self) -> bool {
        match self {
            Command::Pull { .. } => true,
            Command::Push { dry_run, .. } => !dry_run,
            _ => false,
        }
    }
}
