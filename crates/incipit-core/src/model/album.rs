use serde::{Deserialize, Serialize};

use crate::model::Artist;

/// An album as named by the catalogue.
///
/// Albums are value objects, not interned: two tracks on the same album
/// carry structurally equal copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,

    /// Album artists, in catalogue order. May be empty.
    #[serde(default)]
    pub artists: Vec<Artist>,

    /// Track-count hint, when the catalogue carries one.
    #[serde(default)]
    pub num_tracks: Option<u32>,
}

impl Album {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artists: Vec::new(),
            num_tracks: None,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: Artist) -> Self {
        self.artists.push(artist);
        self
    }

    #[must_use]
    pub fn with_num_tracks(mut self, num_tracks: u32) -> Self {
        self.num_tracks = Some(num_tracks);
        self
    }
}
