//! Archive-wide listings

use super::{format_timestamp, to_json, with_skipped, SourceArgs};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use sen::{Args, CliResult, State};
use serde::Serialize;

/// List conversations in the archive
///
/// Usage:
///   convostat conversations --archive messages/
///   convostat conversations --groups
#[derive(Parser, Debug)]
pub struct ConversationsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only show group conversations
    #[arg(short, long)]
    pub groups: bool,
}

#[derive(Serialize)]
struct ConversationRow {
    participants: String,
    group: bool,
    messages: usize,
    first: Option<String>,
    last: Option<String>,
}

#[sen::handler]
pub async fn conversations(
    state: State<AppState>,
    Args(args): Args<ConversationsArgs>,
) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let rows: Vec<ConversationRow> = loaded
        .archive
        .conversations()
        .filter(|c| !args.groups || c.is_group())
        .map(|c| ConversationRow {
            participants: c.key().display_name(),
            group: c.is_group(),
            messages: c.len(),
            first: c.first().map(|m| format_timestamp(m.timestamp)),
            last: c.last().map(|m| format_timestamp(m.timestamp)),
        })
        .collect();

    if args.source.json {
        return to_json(&rows, &loaded.skipped);
    }

    if rows.is_empty() {
        return Ok(with_skipped("No conversations found.".to_string(), &loaded.skipped));
    }

    // Build table
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Participants").fg(Color::Green),
            Cell::new("Group").fg(Color::Green),
            Cell::new("Messages").fg(Color::Green),
            Cell::new("First").fg(Color::Green),
            Cell::new("Last").fg(Color::Green),
        ]);

    for row in &rows {
        table.add_row(vec![
            row.participants.clone(),
            if row.group { "yes" } else { "no" }.to_string(),
            row.messages.to_string(),
            row.first.clone().unwrap_or_default(),
            row.last.clone().unwrap_or_default(),
        ]);
    }

    let output = format!("\n{}\n\nTotal: {} conversations", table, rows.len());
    Ok(with_skipped(output, &loaded.skipped))
}

/// Message count per conversation
///
/// Usage:
///   convostat counts
///   convostat counts --limit 10
#[derive(Parser, Debug)]
pub struct CountsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[sen::handler]
pub async fn counts(state: State<AppState>, Args(args): Args<CountsArgs>) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let mut counts = loaded.archive.stats().message_count();
    if let Some(limit) = args.limit {
        counts.truncate(limit);
    }

    ranking(&counts, "Messages", args.source.json, &loaded.skipped)
}

/// Active days per conversation
///
/// Usage:
///   convostat days
///   convostat days --limit 10
#[derive(Parser, Debug)]
pub struct DaysArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[sen::handler]
pub async fn days(state: State<AppState>, Args(args): Args<DaysArgs>) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let mut days = loaded.archive.stats().total_days();
    if let Some(limit) = args.limit {
        days.truncate(limit);
    }

    ranking(&days, "Active days", args.source.json, &loaded.skipped)
}

fn ranking(
    rows: &[(String, usize)],
    column: &str,
    json: bool,
    skipped: &[String],
) -> CliResult<String> {
    if json {
        return to_json(&rows, skipped);
    }

    if rows.is_empty() {
        return Ok(with_skipped("No conversations found.".to_string(), skipped));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(Color::Cyan),
            Cell::new("Participants").fg(Color::Cyan),
            Cell::new(column).fg(Color::Cyan),
        ]);

    for (rank, (name, value)) in rows.iter().enumerate() {
        table.add_row(vec![(rank + 1).to_string(), name.clone(), value.to_string()]);
    }

    Ok(with_skipped(format!("\n{}", table), skipped))
}
