//! The catalogue boundary: ordered track records from a persisted source.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use incipit_core::Track;

use crate::error::{LibraryError, Result};

/// A source of catalogue records.
///
/// Implementations yield the full ordered record sequence on every load;
/// the library service derives an index snapshot from it. Loads run on a
/// blocking task, so implementations may do synchronous I/O.
pub trait CatalogueReader: Send + Sync + fmt::Debug {
    /// Human-readable identifier used in logs and failure reports.
    fn source_name(&self) -> String;

    /// Load the full catalogue, in order.
    ///
    /// # Errors
    /// Returns [`LibraryError::SourceUnavailable`] when records cannot be
    /// produced (missing file, permission error, corrupt container).
    fn load(&self) -> Result<Vec<Track>>;
}

/// A JSON-lines catalogue file: one track record per line.
///
/// Blank lines are ignored. Lines that do not decode to a track record,
/// and records with an empty uri, are skipped with a warning; a missing or
/// unreadable file is a source failure.
#[derive(Debug, Clone)]
pub struct JsonCatalogue {
    path: PathBuf,
}

impl JsonCatalogue {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the catalogue file with `tracks`, one record per line.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written or a record cannot
    /// be encoded.
    pub fn write(&self, tracks: &[Track]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.path)?;
        for track in tracks {
            let line = serde_json::to_string(track)?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    fn unavailable(&self, err: &std::io::Error) -> LibraryError {
        LibraryError::SourceUnavailable {
            source_name: self.source_name(),
            reason: err.to_string(),
        }
    }
}

impl CatalogueReader for JsonCatalogue {
    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<Track>> {
        let file = File::open(&self.path).map_err(|e| self.unavailable(&e))?;
        let reader = BufReader::new(file);

        let mut tracks = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| self.unavailable(&e))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Track>(line) {
                Ok(track) if track.uri.is_empty() => {
                    log::warn!(
                        "Skipping record without uri at {}:{}",
                        self.path.display(),
                        lineno + 1
                    );
                }
                Ok(track) => tracks.push(track),
                Err(e) => {
                    log::warn!(
                        "Skipping malformed record at {}:{}: {e}",
                        self.path.display(),
                        lineno + 1
                    );
                }
            }
        }
        Ok(tracks)
    }
}

/// An in-memory catalogue, for tests and embedding.
#[derive(Debug, Clone)]
pub struct MemoryCatalogue {
    tracks: Vec<Track>,
    available: bool,
}

impl MemoryCatalogue {
    #[must_use]
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            available: true,
        }
    }

    /// A catalogue whose loads always fail, for failure-path tests.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            tracks: Vec::new(),
            available: false,
        }
    }
}

impl CatalogueReader for MemoryCatalogue {
    fn source_name(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Vec<Track>> {
        if self.available {
            Ok(self.tracks.clone())
        } else {
            Err(LibraryError::SourceUnavailable {
                source_name: self.source_name(),
                reason: "marked unavailable".to_string(),
            })
        }
    }
}
