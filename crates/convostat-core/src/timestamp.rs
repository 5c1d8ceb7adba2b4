//! Export timestamp parsing
//!
//! Message headers carry times like `Monday, January 1, 2018 at 9:05AM PST`.
//! The trailing timezone abbreviation is optional. When present it must look
//! like an abbreviation (`PST`, `CEST`, `UTC+01`) and is discarded: all
//! timestamps are kept as naive local times.

use crate::error::ParseFailure;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// chrono format of the timestamp once the timezone token is removed
pub const EXPORT_FORMAT: &str = "%A, %B %d, %Y at %I:%M%p";

static TIMEZONE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2,5}(?:[+-]\d{1,2}(?::\d{2})?)?$").expect("timezone pattern is valid")
});

/// Parse a header timestamp into a naive local date-time
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ParseFailure> {
    let trimmed = raw.trim();
    let body = strip_timezone(trimmed)?;

    NaiveDateTime::parse_from_str(body, EXPORT_FORMAT).map_err(|source| {
        ParseFailure::Timestamp {
            raw: raw.to_string(),
            source,
        }
    })
}

/// Remove and validate the optional trailing timezone token
fn strip_timezone(trimmed: &str) -> Result<&str, ParseFailure> {
    let Some((body, last)) = trimmed.rsplit_once(char::is_whitespace) else {
        return Ok(trimmed);
    };

    if ends_with_meridiem(last) {
        return Ok(trimmed);
    }

    if !TIMEZONE_TOKEN.is_match(last) {
        return Err(ParseFailure::Timezone {
            raw: trimmed.to_string(),
            token: last.to_string(),
        });
    }

    Ok(body.trim_end())
}

fn ends_with_meridiem(token: &str) -> bool {
    let upper = token.to_ascii_uppercase();
    upper.ends_with("AM") || upper.ends_with("PM")
}
