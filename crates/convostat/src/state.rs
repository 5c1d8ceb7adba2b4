//! Application state

use anyhow::Context;
use convostat_core::Archive;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the default archive location
pub const ARCHIVE_ENV: &str = "CONVOSTAT_ARCHIVE";

/// Application state shared across handlers
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Archive used when a command has no `--archive`
    pub default_archive: Option<PathBuf>,
}

/// An archive ready for querying
pub struct LoadedArchive {
    pub archive: Archive,
    /// Messages of documents left out by a lenient load
    pub skipped: Vec<String>,
}

impl AppState {
    /// Create a new AppState
    pub fn new() -> anyhow::Result<Self> {
        let default_archive = match std::env::var_os(ARCHIVE_ENV) {
            Some(path) => Some(expand_path(Path::new(&path))?),
            None => None,
        };
        debug!("Default archive: {:?}", default_archive);

        Ok(Self { default_archive })
    }

    /// Resolve the archive location for a command
    pub fn archive_path(&self, requested: Option<&Path>) -> anyhow::Result<PathBuf> {
        match requested {
            Some(path) => expand_path(path),
            None => self.default_archive.clone().with_context(|| {
                format!("No archive given. Pass --archive <PATH> or set {}", ARCHIVE_ENV)
            }),
        }
    }

    /// Load the archive for a command
    pub fn load(
        &self,
        requested: Option<&Path>,
        skip_malformed: bool,
    ) -> anyhow::Result<LoadedArchive> {
        let path = self.archive_path(requested)?;

        if skip_malformed {
            let (archive, skipped) = Archive::load_lenient(&path)?;
            Ok(LoadedArchive {
                archive,
                skipped: skipped.iter().map(ToString::to_string).collect(),
            })
        } else {
            Ok(LoadedArchive {
                archive: Archive::load(&path)?,
                skipped: Vec::new(),
            })
        }
    }
}

/// Expand tilde in path
fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let path_str = path
        .to_str()
        .with_context(|| format!("Invalid path: {}", path.display()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
