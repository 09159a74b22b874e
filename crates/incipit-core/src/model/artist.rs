use serde::{Deserialize, Serialize};

/// A performing artist as named by the catalogue.
///
/// Artists are value objects with structural equality: two artists denote
/// the same entity only when name and identifier both agree. Query matching
/// compares names only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,

    /// `MusicBrainz` artist ID, when the catalogue carries one.
    #[serde(default)]
    pub musicbrainz_id: Option<String>,
}

impl Artist {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            musicbrainz_id: None,
        }
    }

    #[must_use]
    pub fn with_musicbrainz_id(mut self, mbid: impl Into<String>) -> Self {
        self.musicbrainz_id = Some(mbid.into());
        self
    }
}
