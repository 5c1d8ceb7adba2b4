//! Command handlers

pub mod histogram;
pub mod list;
pub mod streaks;
pub mod timeline;

use crate::state::{AppState, LoadedArchive};
use chrono::NaiveDateTime;
use clap::Args as ClapArgs;
use convostat_core::{Error, KeyInput};
use sen::CliError;
use serde::Serialize;
use std::path::PathBuf;

/// Archive source flags shared by every command
#[derive(ClapArgs, Debug, Clone)]
pub struct SourceArgs {
    /// Archive document or directory (default: $CONVOSTAT_ARCHIVE)
    #[arg(short, long, value_name = "PATH")]
    pub archive: Option<PathBuf>,

    /// Leave out documents that fail to parse instead of aborting
    #[arg(long)]
    pub skip_malformed: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl SourceArgs {
    pub fn load(&self, app: &AppState) -> Result<LoadedArchive, CliError> {
        app.load(self.archive.as_deref(), self.skip_malformed)
            .map_err(|e| match e.downcast_ref::<Error>() {
                Some(core) if is_user_error(core) => CliError::user(format!("{:#}", e)),
                Some(_) => CliError::system(format!("Failed to load archive: {:#}", e)),
                None => CliError::user(format!("{:#}", e)),
            })
    }
}

/// Conversation named on the command line, possibly split over arguments
pub fn people(args: &[String]) -> KeyInput {
    KeyInput::from(args.join(","))
}

fn is_user_error(e: &Error) -> bool {
    matches!(
        e,
        Error::Parse { .. } | Error::UnknownConversation { .. } | Error::InvalidKeyInput(_)
    )
}

/// Map a query error onto the CLI error kinds
pub fn query_error(e: Error) -> CliError {
    if is_user_error(&e) {
        CliError::user(e.to_string())
    } else {
        CliError::system(format!("Query failed: {}", e))
    }
}

/// JSON document printed by `--json`
#[derive(Serialize)]
struct JsonOutput<'a, T: Serialize> {
    result: &'a T,
    skipped: &'a [String],
}

/// Serialize a command result together with the skipped-document report
pub fn to_json<T: Serialize>(result: &T, skipped: &[String]) -> Result<String, CliError> {
    serde_json::to_string_pretty(&JsonOutput { result, skipped })
        .map_err(|e| CliError::system(format!("Failed to serialize output: {}", e)))
}

/// Append the list of skipped documents, if any
pub fn with_skipped(mut output: String, skipped: &[String]) -> String {
    if !skipped.is_empty() {
        output.push_str(&format!("\n\nSkipped {} malformed documents:\n", skipped.len()));
        for reason in skipped {
            output.push_str(&format!("  - {}\n", reason));
        }
    }
    output
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
