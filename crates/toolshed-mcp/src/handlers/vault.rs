// ============================================================================
// Vault Handlers
// ============================================================================

use chrono::Local;
use serde::Deserialize;
use serde_json::Value;

use super::parse_args;
use crate::Result;
use crate::context::ServerContext;

#[derive(Deserialize)]
struct NoteArgs {
    path: String,
}

#[derive(Deserialize)]
struct DailyNoteArgs {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
struct RecentNotesArgs {
    #[serde(default = "default_days")]
    days: u32,
    #[serde(default)]
    folder: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_days() -> u32 {
    7
}

fn default_limit() -> usize {
    50
}

/// Handle get_note_content - Read one markdown note
pub(super) fn get_note_content(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: NoteArgs = parse_args(arguments)?;
    let note = ctx.vault()?.note_content(&args.path)?;
    tracing::info!(path = %note.path, size = note.size, "Read note");
    Ok(serde_json::to_value(note)?)
}

/// Handle get_daily_note - Daily note for a date, today by default
pub(super) fn get_daily_note(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: DailyNoteArgs = parse_args(arguments)?;
    let note = ctx
        .vault()?
        .daily_note(args.date.as_deref(), Local::now().date_naive())?;
    Ok(serde_json::to_value(note)?)
}

/// Handle list_recent_notes - Recently modified notes, newest first
pub(super) fn list_recent_notes(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: RecentNotesArgs = parse_args(arguments)?;
    let notes = ctx
        .vault()?
        .recent_notes(args.days, &args.folder, args.limit, Local::now())?;
    Ok(serde_json::to_value(notes)?)
}
