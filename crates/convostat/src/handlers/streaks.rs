//! Streak command

use super::{people, query_error, to_json, with_skipped, SourceArgs};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use sen::{Args, CliResult, State};

/// Show runs of consecutive days with messages
///
/// Usage:
///   convostat streaks Alice Bob
///   convostat streaks "Alice, Bob" --min-length 3
#[derive(Parser, Debug)]
pub struct StreaksArgs {
    /// Conversation participants (names or comma-separated lists)
    #[arg(required = true)]
    pub people: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Only list runs at least this many days long
    #[arg(short, long, default_value = "1")]
    pub min_length: usize,
}

#[sen::handler]
pub async fn streaks(state: State<AppState>, Args(args): Args<StreaksArgs>) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let stats = loaded.archive.stats();
    let streaks = stats.consec_days(people(&args.people)).map_err(query_error)?;

    if args.source.json {
        return to_json(&streaks, &loaded.skipped);
    }

    let mut output = String::new();
    output.push_str(&format!("\nLongest streak: {} days\n", streaks.max_streak));
    output.push_str(&format!("Streaks:        {}\n", streaks.runs.len()));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Start").fg(Color::Yellow),
            Cell::new("Days").fg(Color::Yellow),
        ]);

    let mut shown = 0;
    for run in streaks.runs.iter().filter(|run| run.length >= args.min_length) {
        let days = if run.length == streaks.max_streak {
            Cell::new(run.length).fg(Color::Green)
        } else {
            Cell::new(run.length)
        };
        table.add_row(vec![Cell::new(run.start.format("%Y-%m-%d")), days]);
        shown += 1;
    }

    if shown > 0 {
        output.push_str(&format!("\n{}\n", table));
    }

    Ok(with_skipped(output, &loaded.skipped))
}
