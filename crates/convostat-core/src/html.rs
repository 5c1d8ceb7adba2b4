//! Export document parsing
//!
//! A document holds one or more `div.thread` containers. The direct
//! children of a container are flattened into a stream of typed sibling
//! nodes (message headers, paragraphs, anything else) and walked by a
//! two-state machine that groups paragraphs under the preceding header.

use crate::error::ParseFailure;
use crate::timestamp::parse_timestamp;
use crate::types::{Message, ParticipantKey};
use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::debug;

static THREAD: LazyLock<Selector> = LazyLock::new(|| selector("div.thread"));
static SENDER: LazyLock<Selector> = LazyLock::new(|| selector("span.user"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("span.meta"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// One conversation container, fully parsed
#[derive(Debug, Clone)]
pub struct ParsedThread {
    pub key: ParticipantKey,
    pub messages: Vec<Message>,
}

/// Typed direct child of a conversation container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiblingNode {
    /// `div.message` with sender and raw timestamp text
    Header { sender: String, timestamp: String },
    /// `p` with its trimmed text
    Paragraph(String),
    /// Any other element or non-blank text
    Other,
}

/// Parse every conversation container in a document
///
/// Either every container parses or the whole document fails.
pub fn parse_document(html: &str) -> Result<Vec<ParsedThread>, ParseFailure> {
    let document = Html::parse_document(html);

    let mut threads = Vec::new();
    for thread in document.select(&THREAD) {
        let key = participants(thread)?;
        let nodes = sibling_nodes(thread)?;
        let messages = walk(nodes)?;
        debug!("Parsed thread {} with {} messages", key, messages.len());
        threads.push(ParsedThread { key, messages });
    }

    if threads.is_empty() {
        return Err(ParseFailure::NoThread);
    }
    Ok(threads)
}

/// Participant key from the container's `h3` heading
fn participants(thread: ElementRef<'_>) -> Result<ParticipantKey, ParseFailure> {
    let heading = thread
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "h3")
        .ok_or(ParseFailure::MissingHeading)?;

    let text = element_text(heading);
    participants_from_heading(&text)
}

/// Names after the first colon of a heading such as `Participants: A, B`
pub fn participants_from_heading(text: &str) -> Result<ParticipantKey, ParseFailure> {
    let (_prefix, names) = text
        .split_once(':')
        .ok_or_else(|| ParseFailure::NoParticipantList(text.to_string()))?;

    let key = ParticipantKey::parse(names);
    if key.is_empty() {
        return Err(ParseFailure::NoParticipantList(text.to_string()));
    }
    Ok(key)
}

/// Flatten the container's direct children, skipping blank text and comments
fn sibling_nodes(thread: ElementRef<'_>) -> Result<Vec<SiblingNode>, ParseFailure> {
    let mut nodes = Vec::new();

    for child in thread.children() {
        match child.value() {
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Text(_) => nodes.push(SiblingNode::Other),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    nodes.push(classify(element)?);
                }
            }
            _ => {}
        }
    }

    Ok(nodes)
}

fn classify(element: ElementRef<'_>) -> Result<SiblingNode, ParseFailure> {
    let value = element.value();

    if value.name() == "p" {
        return Ok(SiblingNode::Paragraph(element_text(element)));
    }

    if value.name() == "div" && value.classes().any(|class| class == "message") {
        let sender = element
            .select(&SENDER)
            .next()
            .ok_or(ParseFailure::MissingSender)?;
        let meta = element
            .select(&META)
            .next()
            .ok_or(ParseFailure::MissingTimestamp)?;

        return Ok(SiblingNode::Header {
            sender: element_text(sender),
            timestamp: element_text(meta),
        });
    }

    Ok(SiblingNode::Other)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Message being assembled from a header and its paragraphs
#[derive(Debug)]
struct PendingMessage {
    sender: String,
    timestamp: NaiveDateTime,
    lines: Vec<String>,
}

impl PendingMessage {
    fn open(sender: String, raw_timestamp: &str) -> Result<Self, ParseFailure> {
        Ok(Self {
            sender,
            timestamp: parse_timestamp(raw_timestamp)?,
            lines: Vec::new(),
        })
    }

    fn finish(self) -> Message {
        Message::new(self.sender, self.timestamp, self.lines.join("\n"))
    }
}

#[derive(Debug)]
enum WalkState {
    AwaitingHeader,
    ConsumingBody(PendingMessage),
}

/// Group paragraphs under their headers
///
/// Content before the first header is skipped. A header consumes every
/// paragraph up to the next header; any other node closes the message and
/// the walk waits for the next header again.
pub fn walk(nodes: Vec<SiblingNode>) -> Result<Vec<Message>, ParseFailure> {
    let mut messages = Vec::new();
    let mut state = WalkState::AwaitingHeader;

    for node in nodes {
        state = match (state, node) {
            (WalkState::AwaitingHeader, SiblingNode::Header { sender, timestamp }) => {
                WalkState::ConsumingBody(PendingMessage::open(sender, &timestamp)?)
            }
            (WalkState::AwaitingHeader, _) => WalkState::AwaitingHeader,
            (WalkState::ConsumingBody(mut pending), SiblingNode::Paragraph(line)) => {
                pending.lines.push(line);
                WalkState::ConsumingBody(pending)
            }
            (WalkState::ConsumingBody(pending), SiblingNode::Header { sender, timestamp }) => {
                messages.push(pending.finish());
                WalkState::ConsumingBody(PendingMessage::open(sender, &timestamp)?)
            }
            (WalkState::ConsumingBody(pending), SiblingNode::Other) => {
                messages.push(pending.finish());
                WalkState::AwaitingHeader
            }
        };
    }

    if let WalkState::ConsumingBody(pending) = state {
        messages.push(pending.finish());
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_BOB: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Alice</title></head>
<body><div class="contents"><h1>Alice</h1>
<div class="thread">
  <h3>Participants: Bob, Alice</h3>
  <p>export notice</p>
  <div class="message"><div class="message_header"><span class="user">Alice</span><span class="meta">Monday, January 1, 2018 at 9:05AM PST</span></div></div>
  <p>hello</p>
  <p></p>
  <p>anyone there?</p>
  <div class="message"><div class="message_header"><span class="user">Bob</span><span class="meta">Monday, January 1, 2018 at 9:07AM PST</span></div></div>
  <div class="message"><div class="message_header"><span class="user">Bob</span><span class="meta">Tuesday, January 2, 2018 at 11:59PM PST</span></div></div>
  <p>late reply</p>
</div>
</div></body></html>"#;

    fn header(sender: &str, timestamp: &str) -> SiblingNode {
        SiblingNode::Header {
            sender: sender.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    fn paragraph(text: &str) -> SiblingNode {
        SiblingNode::Paragraph(text.to_string())
    }

    #[test]
    fn test_parse_document() {
        let threads = parse_document(ALICE_BOB).unwrap();
        assert_eq!(threads.len(), 1);

        let thread = &threads[0];
        assert_eq!(thread.key.display_name(), "Alice, Bob");
        assert_eq!(thread.messages.len(), 3);

        assert_eq!(thread.messages[0].sender, "Alice");
        assert_eq!(thread.messages[0].text, "hello\n\nanyone there?");
        assert_eq!(thread.messages[1].sender, "Bob");
        assert_eq!(thread.messages[1].text, "");
        assert_eq!(thread.messages[2].text, "late reply");
    }

    #[test]
    fn test_walk_skips_leading_content() {
        let nodes = vec![
            SiblingNode::Other,
            paragraph("preamble"),
            header("Alice", "Monday, January 1, 2018 at 9:05AM"),
            paragraph("hi"),
        ];
        let messages = walk(nodes).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");
    }

    #[test]
    fn test_walk_other_node_closes_body() {
        let nodes = vec![
            header("Alice", "Monday, January 1, 2018 at 9:05AM"),
            paragraph("one"),
            SiblingNode::Other,
            paragraph("stray"),
            header("Bob", "Monday, January 1, 2018 at 9:06AM"),
        ];
        let messages = walk(nodes).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "one");
        assert_eq!(messages[1].text, "");
    }

    #[test]
    fn test_walk_empty_stream() {
        assert!(walk(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_walk_bad_timestamp_fails() {
        let nodes = vec![
            header("Alice", "Monday, January 1, 2018 at 9:05AM"),
            header("Bob", "not a time"),
        ];
        assert!(matches!(walk(nodes), Err(ParseFailure::Timestamp { .. })));
    }

    #[test]
    fn test_heading_prefix_is_discarded() {
        let key = participants_from_heading("Conversation with: Carol,Alice").unwrap();
        assert_eq!(key.display_name(), "Alice, Carol");
    }

    #[test]
    fn test_heading_without_colon_fails() {
        assert_eq!(
            participants_from_heading("Alice, Bob").unwrap_err(),
            ParseFailure::NoParticipantList("Alice, Bob".to_string())
        );
        assert!(participants_from_heading("Participants: , ").is_err());
    }

    #[test]
    fn test_document_without_thread() {
        let err = parse_document("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert_eq!(err, ParseFailure::NoThread);
    }

    #[test]
    fn test_thread_without_heading() {
        let html = r#"<div class="thread"><p>hi</p></div>"#;
        assert_eq!(parse_document(html).unwrap_err(), ParseFailure::MissingHeading);
    }

    #[test]
    fn test_header_without_timestamp() {
        let html = r#"<div class="thread"><h3>Participants: Alice</h3>
            <div class="message"><span class="user">Alice</span></div></div>"#;
        assert_eq!(parse_document(html).unwrap_err(), ParseFailure::MissingTimestamp);
    }

    #[test]
    fn test_multiple_threads_in_one_document() {
        let html = r#"<html><body>
            <div class="thread"><h3>Participants: Alice</h3>
              <div class="message"><span class="user">Alice</span><span class="meta">Monday, January 1, 2018 at 9:05AM</span></div>
              <p>note to self</p>
            </div>
            <div class="thread"><h3>Participants: Bob, Carol</h3>
              <div class="message"><span class="user">Carol</span><span class="meta">Monday, January 1, 2018 at 10:00AM</span></div>
            </div>
        </body></html>"#;
        let threads = parse_document(html).unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].key.display_name(), "Alice");
        assert_eq!(threads[1].key.display_name(), "Bob, Carol");
        assert_eq!(threads[1].messages.len(), 1);
    }
}
