//! MCP Resource definitions
//!
//! | URI | Description | Content-Type |
//! |-----|-------------|--------------|
//! | `vault://daily/<YYYY-MM-DD>` | Today's daily note | text/markdown |
//! | `vault://projects` | Project folders with note counts | application/json |
//! | `router://models` | Category to model routing table | application/json |

use chrono::NaiveDate;
use serde::Serialize;

pub const DAILY_PREFIX: &str = "vault://daily/";
pub const PROJECTS_URI: &str = "vault://projects";
pub const MODELS_URI: &str = "router://models";

/// Resource listing entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Content returned by resources/read
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Resources available on `today`; the daily note URI moves with the date.
pub fn get_resource_definitions(today: NaiveDate) -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: format!("{DAILY_PREFIX}{}", today.format("%Y-%m-%d")),
            name: "Today's Daily Note".to_string(),
            description: "The daily note for today".to_string(),
            mime_type: "text/markdown".to_string(),
        },
        ResourceDefinition {
            uri: PROJECTS_URI.to_string(),
            name: "All Projects".to_string(),
            description: "Project folders in the vault".to_string(),
            mime_type: "application/json".to_string(),
        },
        ResourceDefinition {
            uri: MODELS_URI.to_string(),
            name: "Model Routing Table".to_string(),
            description: "Which model each task category is routed to".to_string(),
            mime_type: "application/json".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_uri_uses_date() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let resources = get_resource_definitions(today);
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].uri, "vault://daily/2025-01-09");
        let json = serde_json::to_value(&resources[1]).unwrap();
        assert_eq!(json["mimeType"], "application/json");
    }
}
