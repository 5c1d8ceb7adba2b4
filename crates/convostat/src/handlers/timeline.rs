//! Timeline command

use super::{format_timestamp, people, query_error, to_json, with_skipped, SourceArgs};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use sen::{Args, CliResult, State};

/// Show who wrote when, in chronological order
///
/// Usage:
///   convostat timeline Alice Bob
///   convostat timeline "Alice, Bob" --limit 20
#[derive(Parser, Debug)]
pub struct TimelineArgs {
    /// Conversation participants (names or comma-separated lists)
    #[arg(required = true)]
    pub people: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum number of messages
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[sen::handler]
pub async fn timeline(state: State<AppState>, Args(args): Args<TimelineArgs>) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let mut entries = loaded
        .archive
        .stats()
        .names_times(people(&args.people))
        .map_err(query_error)?;
    let total = entries.len();
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if args.source.json {
        return to_json(&entries, &loaded.skipped);
    }

    if entries.is_empty() {
        return Ok(with_skipped("No messages found.".to_string(), &loaded.skipped));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Time").fg(Color::Green),
            Cell::new("Sender").fg(Color::Green),
        ]);

    for (sender, timestamp) in &entries {
        table.add_row(vec![format_timestamp(*timestamp), sender.clone()]);
    }

    let output = format!("\n{}\n\nShowing {} of {} messages", table, entries.len(), total);
    Ok(with_skipped(output, &loaded.skipped))
}
