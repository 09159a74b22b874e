use serde::{Deserialize, Serialize};

use crate::model::{Album, Artist};

/// A single catalogue track.
///
/// The `uri` is the lookup key within one library instance. Tracks are
/// immutable once built; a new catalogue read produces new instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    pub name: String,

    /// Track artists, in catalogue order. May be empty.
    #[serde(default)]
    pub artists: Vec<Artist>,

    #[serde(default)]
    pub album: Option<Album>,

    /// Full or partial ISO-8601 date: `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,

    /// Duration in milliseconds.
    #[serde(default)]
    pub length: Option<u64>,

    /// Position on the album, starting at 1.
    #[serde(default)]
    pub track_no: Option<u32>,
}

impl Track {
    #[must_use]
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            artists: Vec::new(),
            album: None,
            date: None,
            length: None,
            track_no: None,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: Artist) -> Self {
        self.artists.push(artist);
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: Album) -> Self {
        self.album = Some(album);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_length(mut self, millis: u64) -> Self {
        self.length = Some(millis);
        self
    }

    #[must_use]
    pub fn with_track_no(mut self, track_no: u32) -> Self {
        self.track_no = Some(track_no);
        self
    }
}

/// Returns `true` when `value` has the shape of a full or partial ISO-8601
/// date: `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
///
/// Only the shape is checked, not calendar validity; the catalogue is
/// trusted for the rest.
#[must_use]
pub fn is_partial_date(value: &str) -> bool {
    fn digits(part: &str, len: usize) -> bool {
        part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
    }

    match value.split('-').collect::<Vec<_>>().as_slice() {
        [year] => digits(year, 4),
        [year, month] => digits(year, 4) && digits(month, 2),
        [year, month, day] => digits(year, 4) && digits(month, 2) && digits(day, 2),
        _ => false,
    }
}
