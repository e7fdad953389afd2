//! Scenario tests across settings, vault, rotation, router and MCP
//!
//! Each scenario loads a real `toolshed.toml`, builds the server the way
//! `toolshed mcp` does (apart from the secret store) and drives it through
//! JSON-RPC messages.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use toolshed_core::{Settings, SettingsLoader};
use toolshed_mcp::{ServerContext, ToolshedMcpServer};
use toolshed_rotation::{MemorySecretStore, RotationManager};
use toolshed_router::Router;
use toolshed_test_utils::TestVault;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Write `body` as toolshed.toml beside the vault and load it without
/// consulting the process environment.
fn load_settings(vault: &TestVault, body: &str) -> Settings {
    let header = format!(
        "[vault]\nroot = \"{}\"\n\n[rotation]\nstate_dir = \"{}\"\nnotify = false\n",
        vault.root().display(),
        vault.state_dir().display()
    );
    let path: PathBuf = vault.outside().join("toolshed.toml");
    fs::write(&path, format!("{header}{body}")).unwrap();

    SettingsLoader::new()
        .with_explicit(Some(path))
        .load_with_env(|_| None)
        .unwrap()
}

fn start(settings: Settings, store: Arc<MemorySecretStore>) -> ToolshedMcpServer {
    let rotation = RotationManager::from_settings(&settings.rotation).with_store(store);
    let router = Router::from_settings(&settings.router).unwrap();
    ToolshedMcpServer::new(ServerContext::new(settings, rotation, router))
}

async fn call_tool(server: &ToolshedMcpServer, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    });
    let raw = server.handle_message(&request.to_string()).await.unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

// =============================================================================
// Scenario: automated rotation from configured hooks
// =============================================================================

#[cfg(unix)]
#[tokio::test]
async fn automated_rotation_updates_store_audit_and_status() {
    let vault = TestVault::new();
    let settings = load_settings(
        &vault,
        r#"
[[rotation.services]]
name = "Deploy Key"
op_item = "Deploy Key"
policy_days = 30
automated = true

[rotation.services.hooks]
generate = "echo deploy-new"
test = "test \"$TOOLSHED_CREDENTIAL\" = deploy-new"
"#,
    );
    let store = Arc::new(MemorySecretStore::new("API_Keys"));
    store.insert("Deploy Key", "credential", "deploy-old");
    let server = start(settings, store.clone());

    let status = call_tool(&server, "check_rotation_status", json!({})).await;
    assert!(text(&status).contains("## Deploy Key"));
    assert!(text(&status).contains("Needs Rotation"));

    let rotated = call_tool(&server, "rotate_credential", json!({"service": "Deploy Key"})).await;
    assert!(text(&rotated).contains("Successfully rotated Deploy Key"), "{rotated}");
    assert_eq!(store.get("Deploy Key", "credential").as_deref(), Some("deploy-new"));

    let tested = call_tool(&server, "test_credential", json!({"service": "Deploy Key"})).await;
    assert!(text(&tested).contains("credential test passed"), "{tested}");

    let status = call_tool(&server, "check_rotation_status", json!({})).await;
    assert!(text(&status).contains("Up to date"), "{status}");

    let audit = fs::read_to_string(vault.state_dir().join("audit.jsonl")).unwrap();
    assert!(audit.contains("Deploy Key"));
    assert!(!audit.contains("deploy-new"), "audit log must not hold the secret");
    assert!(!audit.contains("deploy-old"));
}

#[cfg(unix)]
#[tokio::test]
async fn failing_generate_hook_leaves_old_secret() {
    let vault = TestVault::new();
    let settings = load_settings(
        &vault,
        r#"
[[rotation.services]]
name = "Deploy Key"
op_item = "Deploy Key"
automated = true

[rotation.services.hooks]
generate = "exit 3"
"#,
    );
    let store = Arc::new(MemorySecretStore::new("API_Keys"));
    store.insert("Deploy Key", "credential", "deploy-old");
    let server = start(settings, store.clone());

    let rotated = call_tool(&server, "rotate_credential", json!({"service": "Deploy Key"})).await;
    assert!(text(&rotated).contains("did not complete"), "{rotated}");
    assert_eq!(store.get("Deploy Key", "credential").as_deref(), Some("deploy-old"));

    let history = call_tool(&server, "get_rotation_history", json!({"service": "Deploy Key"})).await;
    assert!(text(&history).contains("❌ Deploy Key"), "{history}");
}

// =============================================================================
// Scenario: manual rotation bookkeeping
// =============================================================================

#[tokio::test]
async fn manual_rotation_lifecycle() {
    let vault = TestVault::new();
    let settings = load_settings(&vault, "");
    let server = start(settings, Arc::new(MemorySecretStore::new("API_Keys")));

    let rotate = call_tool(&server, "rotate_credential", json!({"service": "Gamma API"})).await;
    assert!(text(&rotate).contains("requires manual rotation"));
    assert!(text(&rotate).contains("gamma.app/settings/api"));

    let recorded = call_tool(
        &server,
        "record_manual_rotation",
        json!({"service": "Gamma API", "details": "rotated from the dashboard"}),
    )
    .await;
    assert!(recorded["result"].get("isError").is_none(), "{recorded}");

    let history = call_tool(&server, "get_rotation_history", json!({"service": "Gamma API"})).await;
    assert!(text(&history).contains("rotated from the dashboard"));

    let scheduled = call_tool(
        &server,
        "schedule_rotation",
        json!({"service": "Gamma API", "rotation_days": 14}),
    )
    .await;
    assert!(text(&scheduled).contains("Every 14 days"));

    let status = call_tool(&server, "check_rotation_status", json!({})).await;
    assert!(text(&status).contains("Every 14 days"), "{status}");
}

// =============================================================================
// Scenario: routing through a local model server
// =============================================================================

#[tokio::test]
async fn route_task_through_configured_ollama() {
    let mut ollama = mockito::Server::new_async().await;
    let classify = ollama
        .mock("POST", "/api/generate")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"model": "llama3.2:1b", "stream": false})),
            Matcher::Regex("TASK TO CLASSIFY".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "response": "{\"category\": \"efficient_reasoning\", \"confidence\": 0.8, \"reasoning\": \"syllogism\"}",
                "done": true
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    let execute = ollama
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({"model": "phi4"})))
        .with_status(200)
        .with_body(json!({"response": "No.", "done": true}).to_string())
        .expect(1)
        .create_async()
        .await;

    let vault = TestVault::new();
    let settings = load_settings(
        &vault,
        &format!(
            "\n[router]\nollama_base_url = \"{}\"\nclassifier_model = \"llama3.2:1b\"\nrequest_timeout_secs = 5\n",
            ollama.url()
        ),
    );
    let server = start(settings, Arc::new(MemorySecretStore::new("API_Keys")));

    let decision = call_tool(&server, "classify_task", json!({"task": "Are all razzies bloops?"})).await;
    let decision: Value = serde_json::from_str(text(&decision)).unwrap();
    assert_eq!(decision["category"], "efficient_reasoning");
    assert_eq!(decision["selected_model"], "phi4");

    let routed = call_tool(&server, "route_task", json!({"task": "Are all razzies bloops?"})).await;
    let routed: Value = serde_json::from_str(text(&routed)).unwrap();
    assert_eq!(routed["result"], "No.");
    assert_eq!(routed["cost_usd"], 0.0);
    assert_eq!(routed["routing_reasoning"], "syllogism");

    classify.assert_async().await;
    execute.assert_async().await;
}

#[tokio::test]
async fn unreachable_ollama_falls_back_then_reports_error() {
    let vault = TestVault::new();
    let settings = load_settings(
        &vault,
        "\n[router]\nollama_base_url = \"http://127.0.0.1:9\"\nclassifier_model = \"llama3.2:1b\"\nrequest_timeout_secs = 2\n",
    );
    let server = start(settings, Arc::new(MemorySecretStore::new("API_Keys")));

    let decision = call_tool(&server, "classify_task", json!({"task": "hello"})).await;
    let decision: Value = serde_json::from_str(text(&decision)).unwrap();
    assert_eq!(decision["category"], "default_general");
    assert_eq!(decision["confidence"], 0.5);

    let routed = call_tool(&server, "execute_with_model", json!({"model": "phi4", "task": "hello"})).await;
    assert_eq!(routed["result"]["isError"], true, "{routed}");
    assert!(text(&routed).contains("not reachable"), "{routed}");
}

// =============================================================================
// Scenario: vault access
// =============================================================================

#[tokio::test]
async fn vault_notes_from_configured_root() {
    let vault = TestVault::new();
    vault
        .note("Projects/Alpha/README.md", "# Alpha")
        .note("Projects/Beta/plan.md", "# Beta")
        .note_aged("Archive/old.md", "stale", 40)
        .note("node_modules/pkg/README.md", "ignored");
    let settings = load_settings(&vault, "");
    let server = start(settings, Arc::new(MemorySecretStore::new("API_Keys")));

    let note = call_tool(&server, "get_note_content", json!({"path": "Projects/Alpha/README.md"})).await;
    let note: Value = serde_json::from_str(text(&note)).unwrap();
    assert_eq!(note["content"], "# Alpha");

    let recent = call_tool(&server, "list_recent_notes", json!({"days": 7})).await;
    let recent: Value = serde_json::from_str(text(&recent)).unwrap();
    let paths: Vec<&str> = recent
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"Projects/Beta/plan.md"));
    assert!(!paths.contains(&"Archive/old.md"));
    assert!(!paths.iter().any(|p| p.starts_with("node_modules")));

    let escape = call_tool(&server, "get_note_content", json!({"path": "../toolshed.toml"})).await;
    assert_eq!(escape["result"]["isError"], true);
}

#[tokio::test]
async fn missing_vault_only_disables_vault_tools() {
    let vault = TestVault::new();
    let settings = load_settings(&vault, "");
    fs::remove_dir_all(vault.root()).unwrap();
    let server = start(settings, Arc::new(MemorySecretStore::new("API_Keys")));

    let note = call_tool(&server, "get_daily_note", json!({})).await;
    assert_eq!(note["result"]["isError"], true);
    assert!(text(&note).contains("Vault not available"));

    let status = call_tool(&server, "check_rotation_status", json!({})).await;
    assert!(status["result"].get("isError").is_none());

    let models = call_tool(&server, "list_models", json!({})).await;
    assert!(models["result"].get("isError").is_none());
}
