//! # convostat-core
//!
//! Core library for exploring exported chat archives.
//!
//! ## Features
//!
//! - Parsing of exported HTML conversation documents
//! - Merging of conversations by participant set across documents
//! - Message counts, active days, streaks and daily / per-minute histograms
//!
//! ## Example
//!
//! ```no_run
//! use convostat_core::Archive;
//!
//! fn main() -> convostat_core::Result<()> {
//!     // Load every numbered document of the export
//!     let archive = Archive::load("messages")?;
//!
//!     // Query
//!     let stats = archive.stats();
//!     let streaks = stats.consec_days("Alice, Bob")?;
//!     println!("Longest streak: {} days", streaks.max_streak);
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod error;
pub mod html;
pub mod stats;
pub mod timestamp;
pub mod types;

// Re-exports for convenience
pub use archive::{Archive, ArchiveBuilder};
pub use error::{Error, ParseFailure, Result};
pub use stats::{MinuteHistogram, Stats, Streak, Streaks, MINUTES_PER_DAY};
pub use types::{Conversation, KeyInput, Message, ParticipantKey};
