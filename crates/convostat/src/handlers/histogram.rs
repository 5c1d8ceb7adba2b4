//! Histogram commands

use super::{people, query_error, to_json, with_skipped, SourceArgs};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use sen::{Args, CliResult, State};

const BAR_WIDTH: usize = 40;

/// Messages per day, including days without messages
///
/// Usage:
///   convostat daily Alice Bob
///   convostat daily "Alice, Bob" --active-only
#[derive(Parser, Debug)]
pub struct DailyArgs {
    /// Conversation participants (names or comma-separated lists)
    #[arg(required = true)]
    pub people: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Hide days without messages
    #[arg(long)]
    pub active_only: bool,
}

#[sen::handler]
pub async fn daily(state: State<AppState>, Args(args): Args<DailyArgs>) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let days = loaded
        .archive
        .stats()
        .day_counts(people(&args.people))
        .map_err(query_error)?;

    if args.source.json {
        return to_json(&days, &loaded.skipped);
    }

    if days.is_empty() {
        return Ok(with_skipped("No messages found.".to_string(), &loaded.skipped));
    }

    let peak = days.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Messages").fg(Color::Cyan),
            Cell::new(""),
        ]);

    for (day, count) in days.iter().filter(|(_, count)| !args.active_only || *count > 0) {
        table.add_row(vec![
            day.format("%Y-%m-%d %a").to_string(),
            count.to_string(),
            bar(*count, peak),
        ]);
    }

    let total: usize = days.iter().map(|(_, count)| count).sum();
    let output = format!("\n{}\n\nTotal: {} messages over {} days", table, total, days.len());
    Ok(with_skipped(output, &loaded.skipped))
}

/// Messages by time of day
///
/// Usage:
///   convostat minutes Alice Bob
///   convostat minutes Alice Bob --all
#[derive(Parser, Debug)]
pub struct MinutesArgs {
    /// Conversation participants (names or comma-separated lists)
    #[arg(required = true)]
    pub people: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// List every non-empty minute instead of hourly totals
    #[arg(long)]
    pub all: bool,
}

#[sen::handler]
pub async fn minutes(state: State<AppState>, Args(args): Args<MinutesArgs>) -> CliResult<String> {
    let app = state.read().await;
    let loaded = args.source.load(&app)?;

    let histogram = loaded
        .archive
        .stats()
        .minute_hist(people(&args.people))
        .map_err(query_error)?;

    if args.source.json {
        return to_json(&histogram, &loaded.skipped);
    }

    let rows: Vec<(String, usize)> = if args.all {
        histogram
            .counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(minute, count)| (format!("{:02}:{:02}", minute / 60, minute % 60), *count))
            .collect()
    } else {
        histogram
            .by_hour()
            .into_iter()
            .enumerate()
            .map(|(hour, count)| (format!("{:02}:00", hour), count))
            .collect()
    };

    let peak = rows.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Time").fg(Color::Cyan),
            Cell::new("Messages").fg(Color::Cyan),
            Cell::new(""),
        ]);

    for (label, count) in &rows {
        table.add_row(vec![label.clone(), count.to_string(), bar(*count, peak)]);
    }

    let output = format!("\n{}\n\nTotal: {} messages", table, histogram.total());
    Ok(with_skipped(output, &loaded.skipped))
}

/// Bar scaled against the largest value
fn bar(count: usize, peak: usize) -> String {
    if peak == 0 {
        return String::new();
    }
    "█".repeat((count * BAR_WIDTH).div_ceil(peak))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(1, 1000).chars().count(), 1);
    }
}
