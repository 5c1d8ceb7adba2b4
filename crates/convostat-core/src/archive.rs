//! Archive loading and conversation lookup

use crate::html::parse_document;
use crate::{Conversation, Error, KeyInput, Message, ParseFailure, ParticipantKey, Result, Stats};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// All conversations of an export, keyed by participant set
///
/// Built once from source documents and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    conversations: BTreeMap<ParticipantKey, Conversation>,
}

impl Archive {
    /// Load an archive from one document or a directory of documents
    ///
    /// Any malformed document aborts the load.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use convostat_core::Archive;
    ///
    /// let archive = Archive::load("facebook/messages").unwrap();
    /// for (name, count) in archive.stats().message_count() {
    ///     println!("{name}: {count}");
    /// }
    /// ```
    pub fn load<P: AsRef<Path>>(source: P) -> Result<Self> {
        let source = source.as_ref();
        info!("Loading archive from: {}", source.display());

        let mut builder = ArchiveBuilder::new();
        for file in source_files(source)? {
            builder.add_file(&file)?;
        }

        let archive = builder.build();
        info!("Loaded {} conversations", archive.len());
        Ok(archive)
    }

    /// Load an archive, leaving out documents that fail to parse
    ///
    /// Parse errors of skipped documents are returned with the archive.
    /// Read and listing errors still abort the load.
    pub fn load_lenient<P: AsRef<Path>>(source: P) -> Result<(Self, Vec<Error>)> {
        let source = source.as_ref();
        info!("Loading archive from: {} (lenient)", source.display());

        let mut builder = ArchiveBuilder::new();
        let mut skipped = Vec::new();
        for file in source_files(source)? {
            match builder.add_file(&file) {
                Ok(_) => {}
                Err(err) if err.is_parse() => {
                    warn!("Skipping malformed document: {}", err);
                    skipped.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        let archive = builder.build();
        info!(
            "Loaded {} conversations ({} documents skipped)",
            archive.len(),
            skipped.len()
        );
        Ok((archive, skipped))
    }

    /// Start building an archive document by document
    pub fn builder() -> ArchiveBuilder {
        ArchiveBuilder::new()
    }

    /// Number of conversations
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Conversation keys in key order
    pub fn keys(&self) -> impl Iterator<Item = &ParticipantKey> {
        self.conversations.keys()
    }

    /// Conversations in key order
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    /// Look up a canonical key
    pub fn get(&self, key: &ParticipantKey) -> Option<&Conversation> {
        self.conversations.get(key)
    }

    /// Resolve a name specifier and look up its conversation
    pub fn conversation(&self, person: impl Into<KeyInput>) -> Result<&Conversation> {
        let key = person.into().resolve()?;
        self.conversations
            .get(&key)
            .ok_or_else(|| Error::UnknownConversation {
                key: key.display_name(),
            })
    }

    /// Statistics queries over this archive
    pub fn stats(&self) -> Stats<'_> {
        Stats::new(self)
    }
}

/// Incremental archive construction
///
/// Documents are merged by participant key in the order they are added.
/// [`ArchiveBuilder::build`] sorts each conversation by timestamp; the sort
/// is stable, so equal timestamps keep their arrival order.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    pending: BTreeMap<ParticipantKey, Vec<Message>>,
    documents: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one document and merge its conversations
    ///
    /// Nothing is merged unless the whole document parses. Returns the
    /// number of messages accepted.
    pub fn add_document(&mut self, source_name: &str, html: &str) -> Result<usize> {
        let threads = parse_document(html).map_err(|kind| Error::parse(source_name, kind))?;

        let mut accepted = 0;
        for thread in threads {
            accepted += thread.messages.len();
            self.add_messages(thread.key, thread.messages);
        }

        self.documents += 1;
        debug!("Merged {} messages from {}", accepted, source_name);
        Ok(accepted)
    }

    /// Append already parsed messages to a conversation
    pub fn add_messages<I>(&mut self, key: ParticipantKey, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        self.pending.entry(key).or_default().extend(messages);
    }

    /// Read and merge one document from disk
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let html = String::from_utf8(bytes)
            .map_err(|e| Error::parse(&source_name, ParseFailure::Encoding(e.utf8_error())))?;
        self.add_document(&source_name, &html)
    }

    /// Number of documents merged so far
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Sort every conversation and freeze the archive
    pub fn build(self) -> Archive {
        let conversations = self
            .pending
            .into_iter()
            .map(|(key, messages)| (key.clone(), Conversation::new(key, messages)))
            .collect();
        Archive { conversations }
    }
}

/// Documents making up an archive source
///
/// A file is its own single document. A directory contributes its
/// `*.html` / `*.htm` files (not recursive), numbered stems first in
/// numeric order, the rest by name.
pub fn source_files(source: &Path) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        return Ok(vec![source.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && is_html(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| document_order(a).cmp(&document_order(b)));
    debug!("Found {} documents in {}", files.len(), source.display());
    Ok(files)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn document_order(path: &Path) -> (bool, u64, String) {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    match stem.parse::<u64>() {
        Ok(number) => (false, number, stem.to_string()),
        Err(_) => (true, 0, stem.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn document(participants: &str, messages: &[(&str, &str, &str)]) -> String {
        let mut html = format!(
            "<html><body><div class=\"thread\"><h3>Participants: {}</h3>",
            participants
        );
        for (sender, timestamp, text) in messages {
            html.push_str(&format!(
                "<div class=\"message\"><div class=\"message_header\"><span class=\"user\">{}</span><span class=\"meta\">{}</span></div></div><p>{}</p>",
                sender, timestamp, text
            ));
        }
        html.push_str("</div></body></html>");
        html
    }

    #[test]
    fn test_merge_same_key_across_documents() {
        let mut builder = Archive::builder();
        builder
            .add_document(
                "1.html",
                &document(
                    "Alice, Bob",
                    &[
                        ("Alice", "Tuesday, January 2, 2018 at 9:00AM PST", "second day"),
                        ("Bob", "Thursday, January 4, 2018 at 9:00AM PST", "fourth day"),
                    ],
                ),
            )
            .unwrap();
        builder
            .add_document(
                "2.html",
                &document(
                    "Bob,Alice",
                    &[("Bob", "Monday, January 1, 2018 at 9:00AM PST", "first day")],
                ),
            )
            .unwrap();
        assert_eq!(builder.documents(), 2);

        let archive = builder.build();
        assert_eq!(archive.len(), 1);

        let conversation = archive.conversation("Alice,Bob").unwrap();
        let texts: Vec<&str> = conversation.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first day", "second day", "fourth day"]);
    }

    #[test]
    fn test_timestamp_ties_keep_arrival_order() {
        let at = "Monday, January 1, 2018 at 9:00AM PST";
        let mut builder = Archive::builder();
        builder
            .add_document("1.html", &document("Alice", &[("Alice", at, "from one")]))
            .unwrap();
        builder
            .add_document("2.html", &document("Alice", &[("Alice", at, "from two")]))
            .unwrap();

        let archive = builder.build();
        let conversation = archive.conversation("Alice").unwrap();
        assert_eq!(conversation.messages()[0].text, "from one");
        assert_eq!(conversation.messages()[1].text, "from two");
    }

    #[test]
    fn test_malformed_document_adds_nothing() {
        let mut builder = Archive::builder();
        let html = r#"<html><body><div class="thread"><h3>Participants: Alice</h3>
            <div class="message"><span class="user">Alice</span><span class="meta">Monday, January 1, 2018 at 9:00AM</span></div>
            <div class="message"><span class="user">Alice</span><span class="meta">someday</span></div>
            </div></body></html>"#;

        let err = builder.add_document("broken.html", html).unwrap_err();
        assert!(matches!(err, Error::Parse { ref source_name, .. } if source_name == "broken.html"));
        assert_eq!(builder.documents(), 0);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_unknown_conversation() {
        let archive = Archive::default();
        assert!(matches!(
            archive.conversation("Nobody"),
            Err(Error::UnknownConversation { .. })
        ));
    }

    #[test]
    fn test_source_files_numeric_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["10.html", "2.html", "1.htm", "index.html", "notes.txt"] {
            fs::write(temp_dir.path().join(name), "").unwrap();
        }
        fs::create_dir(temp_dir.path().join("photos")).unwrap();

        let files = source_files(temp_dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1.htm", "2.html", "10.html", "index.html"]);
    }

    #[test]
    fn test_source_file_is_single_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.htm");
        fs::write(&path, "").unwrap();
        assert_eq!(source_files(&path).unwrap(), vec![path]);
    }

    #[test]
    fn test_load_directory_strict_and_lenient() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("1.html"),
            document("Alice, Bob", &[("Alice", "Monday, January 1, 2018 at 9:00AM PST", "hi")]),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("2.html"),
            "<html><body><div class=\"thread\"><h3>Alice and Carol</h3></div></body></html>",
        )
        .unwrap();

        assert!(Archive::load(temp_dir.path()).unwrap_err().is_parse());

        let (archive, skipped) = Archive::load_lenient(temp_dir.path()).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert!(archive.conversation(["Bob", "Alice"]).is_ok());
    }

    #[test]
    fn test_non_utf8_document_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("1.html");
        let mut bytes = document("Alice", &[("Alice", "Monday, January 1, 2018 at 9:00AM", "hi")])
            .into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x80]);
        fs::write(&path, bytes).unwrap();

        let mut builder = Archive::builder();
        match builder.add_file(&path) {
            Err(Error::Parse { source_name, kind }) => {
                assert!(source_name.ends_with("1.html"));
                assert!(matches!(kind, ParseFailure::Encoding(_)));
            }
            other => panic!("expected encoding failure, got {:?}", other),
        }
        assert_eq!(builder.documents(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Archive::load(temp_dir.path().join("absent.html")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
