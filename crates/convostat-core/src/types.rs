//! Core data types: participant keys, messages and conversations

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Canonical identifier of a conversation
///
/// The sorted, deduplicated list of participant names. Two conversations
/// with the same participant set always share one key, no matter the order
/// or repetition the names were given in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ParticipantKey(Vec<String>);

impl ParticipantKey {
    /// Build a key from names in any order
    ///
    /// Names are trimmed; empty names are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Self(names)
    }

    /// Build a key from a comma-separated name list
    pub fn parse(names: &str) -> Self {
        Self::new(names.split(','))
    }

    /// Participant names, sorted
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display form used in statistics output ("Alice, Bob")
    pub fn display_name(&self) -> String {
        self.0.join(", ")
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A query's conversation specifier
///
/// Every form resolves to a [`ParticipantKey`] through [`KeyInput::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// Comma-separated names, e.g. `"Bob, Alice"`
    ByString(String),
    /// Individual names in any order
    ByNameList(Vec<String>),
    /// An already canonical key
    ByKey(ParticipantKey),
}

impl KeyInput {
    /// Normalize into a canonical key
    ///
    /// Fails with [`Error::InvalidKeyInput`] when no name survives
    /// normalization.
    pub fn resolve(self) -> Result<ParticipantKey> {
        let (key, raw) = match self {
            KeyInput::ByString(names) => (ParticipantKey::parse(&names), names),
            KeyInput::ByNameList(names) => {
                let raw = format!("{:?}", names);
                (ParticipantKey::new(&names), raw)
            }
            KeyInput::ByKey(key) => {
                let raw = key.display_name();
                (key, raw)
            }
        };

        if key.is_empty() {
            return Err(Error::InvalidKeyInput(raw));
        }
        Ok(key)
    }
}

impl From<&str> for KeyInput {
    fn from(s: &str) -> Self {
        KeyInput::ByString(s.to_string())
    }
}

impl From<String> for KeyInput {
    fn from(s: String) -> Self {
        KeyInput::ByString(s)
    }
}

impl From<&String> for KeyInput {
    fn from(s: &String) -> Self {
        KeyInput::ByString(s.clone())
    }
}

impl From<Vec<String>> for KeyInput {
    fn from(names: Vec<String>) -> Self {
        KeyInput::ByNameList(names)
    }
}

impl From<Vec<&str>> for KeyInput {
    fn from(names: Vec<&str>) -> Self {
        KeyInput::ByNameList(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for KeyInput {
    fn from(names: &[&str]) -> Self {
        KeyInput::ByNameList(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyInput {
    fn from(names: [&str; N]) -> Self {
        KeyInput::ByNameList(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<ParticipantKey> for KeyInput {
    fn from(key: ParticipantKey) -> Self {
        KeyInput::ByKey(key)
    }
}

impl From<&ParticipantKey> for KeyInput {
    fn from(key: &ParticipantKey) -> Self {
        KeyInput::ByKey(key.clone())
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Sender display name
    pub sender: String,
    /// Local send time, minute resolution
    pub timestamp: NaiveDateTime,
    /// Message text; paragraphs joined with `\n`, may be empty
    pub text: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        timestamp: NaiveDateTime,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            text: text.into(),
        }
    }

    /// Local calendar date of the message
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// All messages exchanged within one participant set
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    key: ParticipantKey,
    is_group: bool,
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a conversation; messages are sorted by timestamp (stable)
    pub(crate) fn new(key: ParticipantKey, mut messages: Vec<Message>) -> Self {
        messages.sort_by_key(|m| m.timestamp);
        Self {
            is_group: key.len() > 1,
            key,
            messages,
        }
    }

    pub fn key(&self) -> &ParticipantKey {
        &self.key
    }

    /// More than one participant
    pub fn is_group(&self) -> bool {
        self.is_group
    }

    /// Messages in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_key_is_sorted_and_deduplicated() {
        let key = ParticipantKey::new(["Bob", "Alice", "Bob", "", "  "]);
        assert_eq!(key.names(), &["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(key.display_name(), "Alice, Bob");
    }

    #[test]
    fn test_key_parse_trims_names() {
        let key = ParticipantKey::parse(" Carol ,Alice,, Bob");
        assert_eq!(key.display_name(), "Alice, Bob, Carol");
    }

    #[test]
    fn test_resolve_is_form_invariant() {
        let a = KeyInput::from("B,A").resolve().unwrap();
        let b = KeyInput::from(["A", "B"]).resolve().unwrap();
        let c = KeyInput::from("A,B").resolve().unwrap();
        let d = KeyInput::from(ParticipantKey::new(["B", "A"])).resolve().unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
    }

    #[test]
    fn test_resolve_rejects_empty_specifier() {
        assert!(matches!(
            KeyInput::from(" , ").resolve(),
            Err(Error::InvalidKeyInput(_))
        ));
        assert!(matches!(
            KeyInput::from(Vec::<String>::new()).resolve(),
            Err(Error::InvalidKeyInput(_))
        ));
    }

    #[test]
    fn test_conversation_sorts_stably() {
        let key = ParticipantKey::new(["Alice", "Bob"]);
        let conversation = Conversation::new(
            key,
            vec![
                Message::new("Bob", at(2, 10, 0), "later"),
                Message::new("Alice", at(1, 9, 0), "first"),
                Message::new("Bob", at(1, 9, 0), "second"),
            ],
        );

        let texts: Vec<&str> = conversation.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "later"]);
        assert!(conversation.is_group());
    }

    #[test]
    fn test_single_participant_is_not_group() {
        let conversation = Conversation::new(ParticipantKey::new(["Alice"]), Vec::new());
        assert!(!conversation.is_group());
        assert!(conversation.is_empty());
    }
}
