//! End-to-end tool execution against a scratch vault, a scratch audit log
//! and a scripted LLM client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use toolshed_mcp::{ServerContext, ToolshedMcpServer};
use toolshed_rotation::{MemorySecretStore, RotationManager};
use toolshed_router::{CompletionRequest, LlmClient, ModelSpec, Router};
use toolshed_test_utils::TestVault;

/// Classifies everything as structured data and echoes the worker model.
struct Scripted;

#[async_trait]
impl LlmClient for Scripted {
    async fn complete(
        &self,
        model: &ModelSpec,
        request: &CompletionRequest,
    ) -> toolshed_router::Result<String> {
        if request.prompt.contains("TASK TO CLASSIFY") {
            Ok(r#"{"category":"structured_data","confidence":0.9,"reasoning":"schema"}"#.into())
        } else {
            Ok(format!("{} answered", model.id))
        }
    }
}

fn setup_server(fixture: &TestVault) -> ToolshedMcpServer {
    let settings = fixture.settings();
    let rotation = RotationManager::from_settings(&settings.rotation)
        .with_store(Arc::new(MemorySecretStore::new("API_Keys")));
    let router = Router::with_client(&settings.router, Arc::new(Scripted)).unwrap();
    ToolshedMcpServer::new(ServerContext::new(settings, rotation, router))
}

/// Call a tool and return (is_error, text).
async fn call_tool(server: &ToolshedMcpServer, name: &str, arguments: Value) -> (bool, String) {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let raw = server.handle_message(&request.to_string()).await.unwrap();
    let response: Value = serde_json::from_str(&raw).unwrap();
    assert!(response.get("error").is_none(), "protocol error: {response}");

    let result = &response["result"];
    let is_error = result["isError"].as_bool().unwrap_or(false);
    let text = result["content"][0]["text"].as_str().unwrap().to_string();
    (is_error, text)
}

async fn call_json(server: &ToolshedMcpServer, name: &str, arguments: Value) -> Value {
    let (is_error, text) = call_tool(server, name, arguments).await;
    assert!(!is_error, "{name} failed: {text}");
    serde_json::from_str(&text).unwrap()
}

async fn read_resource(server: &ToolshedMcpServer, uri: &str) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 9,
        "method": "resources/read",
        "params": { "uri": uri }
    });
    let raw = server.handle_message(&request.to_string()).await.unwrap();
    serde_json::from_str(&raw).unwrap()
}

// ==========================================================================
// Vault
// ==========================================================================

#[tokio::test]
async fn get_note_content_returns_note_and_metadata() {
    let fixture = TestVault::new();
    fixture.note("Projects/Alpha/README.md", "# Alpha\n\nStatus: active\n");
    let server = setup_server(&fixture);

    let note = call_json(&server, "get_note_content", json!({"path": "Projects/Alpha/README.md"})).await;

    assert_eq!(note["path"], "Projects/Alpha/README.md");
    assert_eq!(note["content"], "# Alpha\n\nStatus: active\n");
    assert_eq!(note["size"], 24);
    assert!(note["modified"].is_string());
}

#[tokio::test]
async fn get_note_content_denies_traversal() {
    let fixture = TestVault::new();
    std::fs::write(fixture.outside().join("private.md"), "secret").unwrap();
    let server = setup_server(&fixture);

    let (is_error, text) =
        call_tool(&server, "get_note_content", json!({"path": "../private.md"})).await;

    assert!(is_error);
    assert!(text.starts_with("Access denied"), "{text}");
    assert!(!text.contains("secret"));
}

#[tokio::test]
async fn get_daily_note_defaults_to_today() {
    let fixture = TestVault::new();
    let today = Local::now().format("%Y-%m-%d").to_string();
    fixture.daily_note(&today, "# Today\n- [ ] ship it\n");
    let server = setup_server(&fixture);

    let note = call_json(&server, "get_daily_note", json!({})).await;
    assert_eq!(note["date"], today);
    assert_eq!(note["exists"], true);
    assert_eq!(note["content"], "# Today\n- [ ] ship it\n");

    let missing = call_json(&server, "get_daily_note", json!({"date": "1999-12-31"})).await;
    assert_eq!(missing["exists"], false);
    assert!(missing["content"].is_null());
    assert_eq!(missing["path"], "Daily Notes/1999-12-31.md");

    let (is_error, text) = call_tool(&server, "get_daily_note", json!({"date": "yesterday"})).await;
    assert!(is_error);
    assert!(text.contains("YYYY-MM-DD"), "{text}");
}

#[tokio::test]
async fn list_recent_notes_uses_defaults() {
    let fixture = TestVault::new();
    fixture
        .note_aged("Inbox/fresh.md", "a", 0)
        .note_aged("Inbox/week-old.md", "b", 10)
        .note_aged("venv/lib/site.md", "c", 0);
    let server = setup_server(&fixture);

    let notes = call_json(&server, "list_recent_notes", Value::Null).await;
    let paths: Vec<&str> = notes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["Inbox/fresh.md"]);

    let notes = call_json(&server, "list_recent_notes", json!({"days": 30, "limit": 1})).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_recent_notes_with_huge_window_lists_everything() {
    let fixture = TestVault::new();
    fixture
        .note_aged("Inbox/fresh.md", "a", 0)
        .note_aged("Archive/ancient.md", "b", 3650);
    let server = setup_server(&fixture);

    let notes = call_json(&server, "list_recent_notes", json!({"days": 4294967295u64})).await;
    let paths: Vec<&str> = notes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["Inbox/fresh.md", "Archive/ancient.md"]);
}

#[tokio::test]
async fn vault_tools_fail_cleanly_without_vault() {
    let fixture = TestVault::new();
    let mut settings = fixture.settings();
    settings.vault.root = Some(fixture.outside().join("missing-vault"));
    let rotation = RotationManager::from_settings(&settings.rotation);
    let router = Router::with_client(&settings.router, Arc::new(Scripted)).unwrap();
    let server = ToolshedMcpServer::new(ServerContext::new(settings, rotation, router));

    let (is_error, text) = call_tool(&server, "get_daily_note", json!({})).await;
    assert!(is_error);
    assert!(text.contains("Vault not available"), "{text}");

    // Other tools are unaffected.
    let (is_error, _) = call_tool(&server, "list_models", json!({})).await;
    assert!(!is_error);
}

#[tokio::test]
async fn vault_resources() {
    let fixture = TestVault::new();
    let today = Local::now().format("%Y-%m-%d").to_string();
    fixture
        .daily_note(&today, "# Today")
        .note("Projects/Alpha/README.md", "a")
        .note("Projects/Beta/plan.md", "b");
    let server = setup_server(&fixture);

    let daily = read_resource(&server, &format!("vault://daily/{today}")).await;
    let content = &daily["result"]["contents"][0];
    assert_eq!(content["mimeType"], "text/markdown");
    assert_eq!(content["text"], "# Today");

    let projects = read_resource(&server, "vault://projects").await;
    let text = projects["result"]["contents"][0]["text"].as_str().unwrap();
    let projects: Value = serde_json::from_str(text).unwrap();
    let names: Vec<&str> = projects
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alpha", "Beta"]);
}

// ==========================================================================
// Rotation
// ==========================================================================

#[tokio::test]
async fn manual_rotation_round_trip() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let (_, status) = call_tool(&server, "check_rotation_status", json!({})).await;
    assert!(status.contains("## TMDB API"));
    assert!(status.contains("- **Last Rotation**: Never"));

    let (is_error, text) = call_tool(&server, "rotate_credential", json!({"service": "TMDB API"})).await;
    assert!(!is_error);
    assert!(text.starts_with("TMDB API requires manual rotation."), "{text}");

    let recorded = call_json(
        &server,
        "record_manual_rotation",
        json!({"service": "TMDB API", "details": "Rotated from the account page"}),
    )
    .await;
    assert_eq!(recorded["entry"]["service"], "TMDB API");
    assert_eq!(recorded["entry"]["status"], "success");
    fixture.assert_state_contains("audit.jsonl", "Rotated from the account page");

    let (_, history) = call_tool(
        &server,
        "get_rotation_history",
        json!({"service": "TMDB API", "limit": 5}),
    )
    .await;
    assert!(history.contains("**Service**: TMDB API"));
    assert!(history.contains("Rotated from the account page"));
}

#[tokio::test]
async fn manual_guide_and_schedule() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let (_, guide) = call_tool(&server, "get_manual_rotation_guide", json!({"service": "Gamma API"})).await;
    assert!(guide.contains("gamma.app"), "{guide}");

    let (is_error, text) = call_tool(
        &server,
        "schedule_rotation",
        json!({"service": "Cloudflare", "rotation_days": 30, "enabled": false}),
    )
    .await;
    assert!(!is_error, "{text}");
    assert!(text.contains("Every 30 days"));
    assert!(text.contains("Status: Disabled"));
    fixture.assert_state_contains("rotation_policies.toml", "rotation_days = 30");

    let (_, status) = call_tool(&server, "check_rotation_status", json!({})).await;
    assert!(status.contains("Every 30 days"));
}

#[tokio::test]
async fn test_credential_without_hook_is_unavailable() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let (is_error, text) = call_tool(&server, "test_credential", json!({"service": "airtable"})).await;
    assert!(!is_error);
    assert_eq!(text, "⚠️  Automated testing not available for Airtable");

    let (is_error, text) = call_tool(&server, "test_credential", json!({"service": "Nope"})).await;
    assert!(is_error);
    assert!(text.contains("Unknown service"), "{text}");
}

// ==========================================================================
// Router
// ==========================================================================

#[tokio::test]
async fn list_models_includes_routing_table() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let listing = call_json(&server, "list_models", json!({})).await;
    assert_eq!(listing["models"].as_array().unwrap().len(), 25);
    assert_eq!(listing["routing_table"]["default_general"], "mixtral:8x7b");
    assert_eq!(listing["routing_table"].as_object().unwrap().len(), 23);
}

#[tokio::test]
async fn classify_then_route() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let decision = call_json(&server, "classify_task", json!({"task": "JSON schema for users"})).await;
    assert_eq!(decision["category"], "structured_data");
    assert_eq!(decision["confidence"], 0.9);

    let result = call_json(&server, "route_task", json!({"task": "JSON schema for users"})).await;
    assert_eq!(result["selected_model"], decision["selected_model"]);
    assert_eq!(result["routing_reasoning"], "schema");
    assert_eq!(result["is_local"], true);
    assert_eq!(result["cost_usd"], 0.0);
}

#[tokio::test]
async fn execute_with_unknown_model_is_tool_error() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let (is_error, text) = call_tool(
        &server,
        "execute_with_model",
        json!({"model": "gpt-9", "task": "hello"}),
    )
    .await;
    assert!(is_error);
    assert!(text.contains("gpt-9"), "{text}");

    let result = call_json(&server, "execute_with_model", json!({"model": "phi4", "task": "hi"})).await;
    assert_eq!(result["result"], "phi4 answered");
    assert!(result["category"].is_null());
}

#[tokio::test]
async fn models_resource_maps_every_category() {
    let fixture = TestVault::new();
    let server = setup_server(&fixture);

    let response = read_resource(&server, "router://models").await;
    let content = &response["result"]["contents"][0];
    assert_eq!(content["mimeType"], "application/json");
    let table: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(table.as_object().unwrap().len(), 23);
    assert_eq!(table["max_quality_reasoning"]["model"], "claude-sonnet-3.7");
    assert_eq!(table["max_quality_reasoning"]["is_local"], false);
}
