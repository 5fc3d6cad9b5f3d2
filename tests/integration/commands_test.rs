use super::common;

use airborne_schema::cli::Command;
use airborne_schema::commands::execute;
use airborne_schema::domain::{FlatSchemaMap, PropertiesPayload, SchemaNode};
use common::test_server::TestServer;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

const FLAT_YAML: &str = r#"
properties:
  network.retry.count:
    description: How many times to retry
    default_value: 2
    schema:
      type: number
      minimum: 0
  network.host:
    schema:
      type: string
      pattern: "^[a-z.]+$"
"#;

async fn run(command: Command, server: &TestServer) -> anyhow::Result<String> {
    let mut out = Vec::new();
    execute(&command, &server.settings(), &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn test_to_schema_from_yaml_flat_map() -> anyhow::Result<()> {
    let server = TestServer::new().await;
    let dir = TempDir::new()?;
    let path = dir.path().join("flat.yaml");
    fs::write(&path, FLAT_YAML)?;

    let output = run(Command::ToSchema { flat_file: path }, &server).await?;
    let schema: Value = serde_json::from_str(&output)?;

    let network = &schema["properties"]["network"];
    assert_eq!(network["type"], "object");
    assert_eq!(network["properties"]["retry"]["properties"]["count"]["default"], json!(2));
    assert_eq!(network["properties"]["host"]["pattern"], "^[a-z.]+$");
    assert_eq!(schema["additionalProperties"], false);
    Ok(())
}

#[tokio::test]
async fn test_to_flat_round_trips_keys() -> anyhow::Result<()> {
    let server = TestServer::new().await;
    let dir = TempDir::new()?;
    let flat_path = dir.path().join("flat.yaml");
    fs::write(&flat_path, FLAT_YAML)?;

    let schema_text = run(Command::ToSchema { flat_file: flat_path }, &server).await?;
    let schema_path = dir.path().join("schema.json");
    fs::write(&schema_path, &schema_text)?;

    let output = run(Command::ToFlat { schema_file: schema_path }, &server).await?;
    let payload: PropertiesPayload = serde_json::from_str(&output)?;
    let keys: Vec<&str> = payload.properties.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["network.host", "network.retry.count"]);

    let count = &payload.properties["network.retry.count"];
    assert_eq!(count.default_value, json!(2));
    assert_eq!(count.description, "How many times to retry");
    assert_eq!(count.schema, json!({"type": "number", "minimum": 0, "default": 2}));

    let host = &payload.properties["network.host"];
    assert_eq!(host.description, "Host");
    assert!(host.schema.get("description").is_none());
    Ok(())
}

#[tokio::test]
async fn test_tree_outline() -> anyhow::Result<()> {
    let server = TestServer::new().await;
    let dir = TempDir::new()?;
    let path = dir.path().join("flat.yaml");
    fs::write(&path, FLAT_YAML)?;

    let output = run(Command::Tree { file: path }, &server).await?;
    assert_eq!(
        output,
        "network: object\n  host: string\n  retry: object\n    count: number\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_validate_reports_errors() -> anyhow::Result<()> {
    let server = TestServer::new().await;
    let dir = TempDir::new()?;
    let schema_path = dir.path().join("schema.json");
    fs::write(
        &schema_path,
        serde_json::to_string(&json!({
            "type": "object",
            "properties": {
                "limit": {"type": "number", "maximum": 10},
                "name": {"type": "string"}
            },
            "required": ["name"]
        }))?,
    )?;

    let values_path = dir.path().join("values.json");
    fs::write(&values_path, r#"{"limit": 11}"#)?;
    let mut out = Vec::new();
    let result = execute(
        &Command::Validate {
            schema: schema_path.clone(),
            values: values_path.clone(),
        },
        &server.settings(),
        &mut out,
    )
    .await;
    assert_eq!(result.unwrap_err().to_string(), "2 validation error(s)");
    assert_eq!(
        String::from_utf8(out)?,
        "limit: Number 11 exceeds maximum 10\nname: Required field is missing\n"
    );

    fs::write(&values_path, r#"{"limit": 4, "name": "shop"}"#)?;
    let output = run(
        Command::Validate {
            schema: schema_path,
            values: values_path,
        },
        &server,
    )
    .await?;
    assert_eq!(output, "All values are valid\n");
    Ok(())
}

#[tokio::test]
async fn test_invalid_json_input() -> anyhow::Result<()> {
    let server = TestServer::new().await;
    let dir = TempDir::new()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"properties\": ")?;

    let err = run(Command::Tree { file: path }, &server).await.unwrap_err();
    assert!(err.to_string().starts_with("Invalid JSON schema format"));
    Ok(())
}

#[tokio::test]
async fn test_push_then_pull() -> anyhow::Result<()> {
    let server = TestServer::new().await;
    let dir = TempDir::new()?;
    let schema_path = dir.path().join("schema.json");
    fs::write(
        &schema_path,
        serde_json::to_string(&json!({
            "properties": {
                "ui": {
                    "type": "object",
                    "properties": {"darkMode": {"type": "boolean", "default": true}}
                }
            }
        }))?,
    )?;

    let dry = run(
        Command::Push {
            schema_file: schema_path.clone(),
            dry_run: true,
        },
        &server,
    )
    .await?;
    assert!(dry.contains("ui.darkMode"));
    assert!(server.requests().is_empty());

    let output = run(
        Command::Push {
            schema_file: schema_path,
            dry_run: false,
        },
        &server,
    )
    .await?;
    assert_eq!(output, "Saved 1 schema entries\n");

    let mut expected = FlatSchemaMap::new();
    expected.insert(
        "ui.darkMode".to_string(),
        SchemaNode::new(json!({"type": "boolean", "default": true}))
            .with_default(json!(true))
            .with_description("Dark Mode"),
    );
    assert_eq!(server.properties(), expected);

    let pulled = dir.path().join("pulled.json");
    run(
        Command::Pull {
            output: Some(pulled.clone()),
        },
        &server,
    )
    .await?;
    let schema: Value = serde_json::from_str(&fs::read_to_string(pulled)?)?;
    assert_eq!(
        schema["properties"]["ui"]["properties"]["darkMode"]["default"],
        json!(true)
    );
    assert_eq!(schema["properties"]["ui"]["description"], "Ui");
    Ok(())
}
