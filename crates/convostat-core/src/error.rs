//! Error types for convostat-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type for convostat-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for convostat-core
#[derive(Error, Debug)]
pub enum Error {
    /// Source document could not be parsed
    #[error("Failed to parse {source_name}: {kind}")]
    Parse {
        source_name: String,
        kind: ParseFailure,
    },

    /// No conversation with the resolved participant key
    #[error("Unknown conversation: {key}")]
    UnknownConversation { key: String },

    /// Name specifier that does not resolve to any participant
    #[error("Invalid conversation key: {0:?}")]
    InvalidKeyInput(String),

    /// Source file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory listing error
    #[error("Failed to list archive directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn parse(source_name: impl Into<String>, kind: ParseFailure) -> Self {
        Error::Parse {
            source_name: source_name.into(),
            kind,
        }
    }

    /// Whether this error came from malformed document content
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Structural problems found while parsing an export document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    /// Document has no conversation container
    #[error("no conversation thread found")]
    NoThread,

    /// Conversation container has no participant heading
    #[error("conversation has no participant heading")]
    MissingHeading,

    /// Heading text carries no colon-delimited participant list
    #[error("heading {0:?} has no participant list")]
    NoParticipantList(String),

    /// Message header without a sender span
    #[error("message header has no sender")]
    MissingSender,

    /// Message header without a timestamp span
    #[error("message header has no timestamp")]
    MissingTimestamp,

    /// Timestamp text does not match the export format
    #[error("unparseable timestamp {raw:?}: {source}")]
    Timestamp {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Document bytes are not UTF-8
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[source] std::str::Utf8Error),

    /// Trailing timezone token is not an abbreviation
    #[error("unrecognised timezone token {token:?} in {raw:?}")]
    Timezone { raw: String, token: String },
}
