//! MCP Tool Handlers
//!
//! Each handler deserializes its arguments into a typed struct and returns
//! either a JSON value (pretty-printed into the tool result) or a plain
//! string (markdown, sent as-is).

mod rotation;
mod router;
mod vault;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::ServerContext;
use crate::{Error, Result};

/// Handle a tool call by dispatching to the appropriate handler
pub async fn handle_tool_call(ctx: &ServerContext, tool_name: &str, arguments: Value) -> Result<Value> {
    match tool_name {
        // Vault
        "get_note_content" => vault::get_note_content(ctx, arguments),
        "get_daily_note" => vault::get_daily_note(ctx, arguments),
        "list_recent_notes" => vault::list_recent_notes(ctx, arguments),

        // Rotation
        "check_rotation_status" => rotation::check_rotation_status(ctx),
        "get_rotation_history" => rotation::get_rotation_history(ctx, arguments),
        "get_manual_rotation_guide" => rotation::get_manual_rotation_guide(ctx, arguments),
        "rotate_credential" => rotation::rotate_credential(ctx, arguments),
        "record_manual_rotation" => rotation::record_manual_rotation(ctx, arguments),
        "test_credential" => rotation::test_credential(ctx, arguments),
        "schedule_rotation" => rotation::schedule_rotation(ctx, arguments),

        // Router
        "list_models" => router::list_models(ctx),
        "classify_task" => router::classify_task(ctx, arguments).await,
        "route_task" => router::route_task(ctx, arguments).await,
        "execute_with_model" => router::execute_with_model(ctx, arguments).await,

        _ => Err(Error::UnknownTool(tool_name.to_string())),
    }
}

/// Deserialize tool arguments; a missing `arguments` object counts as `{}`.
fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArguments(e.to_string()))
}

/// Reject empty strings for required text arguments.
fn non_empty(name: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArguments(format!("`{name}` must not be empty")));
    }
    Ok(value)
}
