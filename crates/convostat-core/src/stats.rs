//! Descriptive statistics over a loaded archive

use crate::{Archive, Conversation, KeyInput, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Minutes in a day, one histogram bucket each
pub const MINUTES_PER_DAY: usize = 24 * 60;

/// A maximal run of consecutive active days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    /// First day of the run
    pub start: NaiveDate,
    /// Number of days in the run
    pub length: usize,
}

/// Consecutive-day runs of a conversation, in chronological order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub max_streak: usize,
    pub runs: Vec<Streak>,
}

impl Streaks {
    /// Split sorted, distinct dates into maximal consecutive runs
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut runs: Vec<Streak> = Vec::new();
        let mut prev: Option<NaiveDate> = None;

        for date in dates {
            match (prev, runs.last_mut()) {
                (Some(prev), Some(run)) if (date - prev).num_days() == 1 => run.length += 1,
                _ => runs.push(Streak {
                    start: date,
                    length: 1,
                }),
            }
            prev = Some(date);
        }

        let max_streak = runs.iter().map(|run| run.length).max().unwrap_or(0);
        Self { max_streak, runs }
    }

    /// Run lengths in chronological order
    pub fn lengths(&self) -> Vec<usize> {
        self.runs.iter().map(|run| run.length).collect()
    }
}

/// Messages per minute of the day
///
/// Buckets are half-open: bucket `i` covers `[edges[i], edges[i + 1])`,
/// so 23:59 (minute 1439) falls in the last bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteHistogram {
    /// Bucket edges `0..=1440`
    pub edges: Vec<u32>,
    /// One count per minute of the day
    pub counts: Vec<usize>,
}

impl MinuteHistogram {
    fn empty() -> Self {
        Self {
            edges: (0..=MINUTES_PER_DAY as u32).collect(),
            counts: vec![0; MINUTES_PER_DAY],
        }
    }

    fn record(&mut self, timestamp: NaiveDateTime) {
        let minute = (timestamp.hour() * 60 + timestamp.minute()) as usize;
        self.counts[minute] += 1;
    }

    /// Count in the bucket starting at `minute` (0 out of range)
    pub fn bucket(&self, minute: usize) -> usize {
        self.counts.get(minute).copied().unwrap_or(0)
    }

    /// Total messages counted
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Counts rolled up into 24 hourly buckets
    pub fn by_hour(&self) -> Vec<usize> {
        self.counts.chunks(60).map(|hour| hour.iter().sum()).collect()
    }
}

/// Read-only statistics queries
///
/// Obtained from [`Archive::stats`]. Queries naming a conversation take any
/// [`KeyInput`] form: `"Bob, Alice"`, `["Alice", "Bob"]` or a key.
#[derive(Clone, Copy)]
pub struct Stats<'a> {
    archive: &'a Archive,
}

impl<'a> Stats<'a> {
    pub(crate) fn new(archive: &'a Archive) -> Self {
        Self { archive }
    }

    fn conversation(&self, person: impl Into<KeyInput>) -> Result<&'a Conversation> {
        let conversation = self.archive.conversation(person)?;
        debug!("Querying conversation: {}", conversation.key());
        Ok(conversation)
    }

    /// Messages per conversation, most messages first
    pub fn message_count(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .archive
            .conversations()
            .map(|c| (c.key().display_name(), c.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Distinct calendar days with at least one message
    pub fn individual_total_days(&self, person: impl Into<KeyInput>) -> Result<usize> {
        Ok(active_dates(self.conversation(person)?).len())
    }

    /// Active days per conversation, most days first
    pub fn total_days(&self) -> Vec<(String, usize)> {
        let mut days: Vec<(String, usize)> = self
            .archive
            .conversations()
            .map(|c| (c.key().display_name(), active_dates(c).len()))
            .collect();
        days.sort_by(|a, b| b.1.cmp(&a.1));
        days
    }

    /// Runs of consecutive active days
    pub fn consec_days(&self, person: impl Into<KeyInput>) -> Result<Streaks> {
        let dates = active_dates(self.conversation(person)?);
        Ok(Streaks::from_dates(dates))
    }

    /// Messages per day from the first to the last active day, gaps as zero
    pub fn day_counts(&self, person: impl Into<KeyInput>) -> Result<Vec<(NaiveDate, usize)>> {
        let conversation = self.conversation(person)?;
        let (Some(first), Some(last)) = (conversation.first(), conversation.last()) else {
            return Ok(Vec::new());
        };

        let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for message in conversation.messages() {
            *by_day.entry(message.date()).or_insert(0) += 1;
        }

        let last_day = last.date();
        Ok(first
            .date()
            .iter_days()
            .take_while(|day| *day <= last_day)
            .map(|day| (day, by_day.get(&day).copied().unwrap_or(0)))
            .collect())
    }

    /// Messages per minute of the day
    pub fn minute_hist(&self, person: impl Into<KeyInput>) -> Result<MinuteHistogram> {
        let conversation = self.conversation(person)?;
        let mut histogram = MinuteHistogram::empty();
        for message in conversation.messages() {
            histogram.record(message.timestamp);
        }
        Ok(histogram)
    }

    /// Sender and time of every message, chronologically
    pub fn names_times(
        &self,
        person: impl Into<KeyInput>,
    ) -> Result<Vec<(String, NaiveDateTime)>> {
        Ok(self
            .conversation(person)?
            .messages()
            .iter()
            .map(|m| (m.sender.clone(), m.timestamp))
            .collect())
    }
}

fn active_dates(conversation: &Conversation) -> BTreeSet<NaiveDate> {
    conversation.messages().iter().map(|m| m.date()).collect()
}
