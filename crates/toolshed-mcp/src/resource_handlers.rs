//! MCP Resource Handlers

use chrono::NaiveDate;
use serde_json::json;

use crate::context::ServerContext;
use crate::resources::{DAILY_PREFIX, MODELS_URI, PROJECTS_URI, ResourceContent};
use crate::{Error, Result};

/// Read a resource by URI
///
/// `vault://daily/` accepts any date, not only today's.
///
/// # Errors
///
/// Returns `Error::UnknownResource` if the URI is not recognized.
pub fn read_resource(ctx: &ServerContext, uri: &str, today: NaiveDate) -> Result<ResourceContent> {
    if let Some(date) = uri.strip_prefix(DAILY_PREFIX) {
        return read_daily(ctx, uri, date, today);
    }
    match uri {
        PROJECTS_URI => read_projects(ctx),
        MODELS_URI => read_models(ctx),
        _ => Err(Error::UnknownResource(uri.to_string())),
    }
}

fn read_daily(ctx: &ServerContext, uri: &str, date: &str, today: NaiveDate) -> Result<ResourceContent> {
    let note = ctx.vault()?.daily_note(Some(date), today)?;
    let text = match note.content {
        Some(content) => content,
        None => format!("# {}\n\n_No daily note yet._\n", note.date),
    };
    Ok(ResourceContent {
        uri: uri.to_string(),
        mime_type: "text/markdown".to_string(),
        text,
    })
}

fn read_projects(ctx: &ServerContext) -> Result<ResourceContent> {
    let projects = ctx.vault()?.projects()?;
    Ok(ResourceContent {
        uri: PROJECTS_URI.to_string(),
        mime_type: "application/json".to_string(),
        text: serde_json::to_string_pretty(&projects)?,
    })
}

fn read_models(ctx: &ServerContext) -> Result<ResourceContent> {
    let registry = ctx.router().registry();
    let table: serde_json::Map<String, serde_json::Value> = registry
        .routing_table()
        .into_iter()
        .map(|(category, model)| {
            let entry = match registry.get(model) {
                Some(spec) => json!({
                    "model": spec.id,
                    "provider": spec.provider.to_string(),
                    "is_local": spec.is_local(),
                    "description": category.description(),
                }),
                None => json!({ "model": model }),
            };
            (category.to_string(), entry)
        })
        .collect();

    Ok(ResourceContent {
        uri: MODELS_URI.to_string(),
        mime_type: "application/json".to_string(),
        text: serde_json::to_string_pretty(&table)?,
    })
}
