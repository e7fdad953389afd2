//! MCP tool definitions
//!
//! # Tool Categories
//!
//! ## Vault (read-only)
//! - `get_note_content` - Read one markdown note
//! - `get_daily_note` - Read the daily note for a date
//! - `list_recent_notes` - Notes modified in the last N days
//!
//! ## Credential Rotation
//! - `check_rotation_status` - Status report for every service
//! - `get_rotation_history` - Recent audit log entries
//! - `get_manual_rotation_guide` - Step-by-step checklist for a service
//! - `rotate_credential` - Rotate an automated service, or return its checklist
//! - `record_manual_rotation` - Log a rotation done by hand
//! - `test_credential` - Probe the stored credential with the service's test hook
//! - `schedule_rotation` - Change a service's rotation period
//!
//! ## LLM Router
//! - `list_models` - Registry and routing table
//! - `classify_task` - Category and model a task would route to
//! - `route_task` - Classify and execute
//! - `execute_with_model` - Run a task on a named model

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn no_arguments() -> serde_json::Value {
    json!({ "type": "object", "properties": {} })
}

fn service_only(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "service": { "type": "string", "description": description }
        },
        "required": ["service"]
    })
}

fn task_only() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "task": { "type": "string", "description": "Task description" }
        },
        "required": ["task"]
    })
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Vault
        tool(
            "get_note_content",
            "Get the content of a specific markdown note in the vault",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path relative to the vault root (e.g. 'Projects/Alpha/README.md')"
                    }
                },
                "required": ["path"]
            }),
        ),
        tool(
            "get_daily_note",
            "Get the daily note for a date (default: today)",
            json!({
                "type": "object",
                "properties": {
                    "date": {
                        "type": "string",
                        "description": "Date in YYYY-MM-DD format"
                    }
                }
            }),
        ),
        tool(
            "list_recent_notes",
            "List notes modified in the last N days, newest first",
            json!({
                "type": "object",
                "properties": {
                    "days": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 7,
                        "description": "Number of days to look back"
                    },
                    "folder": {
                        "type": "string",
                        "default": "",
                        "description": "Folder to search, relative to the vault root"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 50,
                        "description": "Maximum number of notes to return"
                    }
                }
            }),
        ),
        // Rotation
        tool(
            "check_rotation_status",
            "Check which API credentials are due for rotation",
            no_arguments(),
        ),
        tool(
            "get_rotation_history",
            "Get recent rotation audit log entries, most recent first",
            json!({
                "type": "object",
                "properties": {
                    "service": {
                        "type": "string",
                        "description": "Only entries for this service"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "default": 10,
                        "description": "Maximum number of entries"
                    }
                }
            }),
        ),
        tool(
            "get_manual_rotation_guide",
            "Get the step-by-step manual rotation checklist for a service",
            service_only("Service name (e.g. 'Gamma API')"),
        ),
        tool(
            "rotate_credential",
            "Rotate a credential. Automated services are rotated through their hooks; \
             manual services return the rotation checklist",
            json!({
                "type": "object",
                "properties": {
                    "service": { "type": "string", "description": "Service name" },
                    "force": {
                        "type": "boolean",
                        "default": false,
                        "description": "Rotate even if the policy is not yet due"
                    }
                },
                "required": ["service"]
            }),
        ),
        tool(
            "record_manual_rotation",
            "Record that a credential was rotated by hand",
            json!({
                "type": "object",
                "properties": {
                    "service": { "type": "string", "description": "Service name" },
                    "details": {
                        "type": "string",
                        "description": "Notes stored in the audit log"
                    }
                },
                "required": ["service"]
            }),
        ),
        tool(
            "test_credential",
            "Test the stored credential for a service with its test hook",
            service_only("Service name"),
        ),
        tool(
            "schedule_rotation",
            "Set the rotation period for a service",
            json!({
                "type": "object",
                "properties": {
                    "service": { "type": "string", "description": "Service name" },
                    "rotation_days": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Days between rotations"
                    },
                    "enabled": {
                        "type": "boolean",
                        "default": true,
                        "description": "Whether automated rotation is enabled"
                    }
                },
                "required": ["service", "rotation_days"]
            }),
        ),
        // Router
        tool(
            "list_models",
            "List the local and commercial models and the category routing table",
            no_arguments(),
        ),
        tool(
            "classify_task",
            "Classify a task and show which model it would be routed to",
            task_only(),
        ),
        tool(
            "route_task",
            "Classify a task and run it on the selected model",
            task_only(),
        ),
        tool(
            "execute_with_model",
            "Run a task on a specific model, bypassing classification",
            json!({
                "type": "object",
                "properties": {
                    "model": { "type": "string", "description": "Model id (e.g. 'phi4')" },
                    "task": { "type": "string", "description": "Task description" }
                },
                "required": ["model", "task"]
            }),
        ),
    ]
}
