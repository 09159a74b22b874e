//! Media directory scanning: audio files in, catalogue records out.

use std::path::{Path, PathBuf};

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use walkdir::WalkDir;

use incipit_core::model::is_partial_date;
use incipit_core::{Album, Artist, Track};

use crate::error::{LibraryError, Result};

/// Tags extracted from an audio file.
#[derive(Debug, Default)]
struct TagData {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    album_artist: Option<String>,
    track_number: Option<u32>,
    track_total: Option<u32>,
    date: Option<String>,
    year: Option<u32>,
    duration_ms: Option<u64>,
}

/// Walks a media directory and reads one catalogue record per audio file.
///
/// Files are visited in name order so repeated scans of an unchanged tree
/// produce the same catalogue. Unreadable tags degrade to defaults with a
/// warning; only an unusable media directory fails the scan.
#[derive(Debug, Clone)]
pub struct Scanner {
    media_dir: PathBuf,
}

impl Scanner {
    #[must_use]
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
        }
    }

    /// Scan the media directory into catalogue records.
    ///
    /// # Errors
    /// Returns [`LibraryError::SourceUnavailable`] when the media directory
    /// does not exist or is not a directory.
    pub fn scan(&self) -> Result<Vec<Track>> {
        if !self.media_dir.is_dir() {
            return Err(LibraryError::SourceUnavailable {
                source_name: self.media_dir.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        log::info!("Starting scan of {}", self.media_dir.display());

        let mut tracks = Vec::new();
        for entry in WalkDir::new(&self.media_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();
            if !path.is_file() || !Self::is_audio_file(path) {
                continue;
            }

            log::debug!("Scanning: {}", path.display());
            tracks.push(self.read_track(path));
        }

        log::info!("Scan complete: {} files processed", tracks.len());
        Ok(tracks)
    }

    fn is_audio_file(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            matches!(
                ext.to_string_lossy().to_lowercase().as_ref(),
                "flac" | "mp3" | "ogg" | "oga" | "opus" | "wav" | "m4a" | "aac" | "aiff"
            )
        } else {
            false
        }
    }

    fn read_track(&self, path: &Path) -> Track {
        let uri = self.track_uri(path);
        let tags = match Self::extract_tags(path) {
            Ok(tags) => tags,
            Err(e) => {
                log::warn!("Failed to extract tags from {}: {}", path.display(), e);
                TagData::default()
            }
        };

        let name = tags.title.unwrap_or_else(|| {
            path.file_stem()
                .map_or_else(|| uri.clone(), |stem| stem.to_string_lossy().to_string())
        });

        let mut track = Track::new(uri, name);
        if let Some(artist) = tags.artist {
            track = track.with_artist(Artist::new(artist));
        }
        if let Some(album_name) = tags.album {
            let mut album = Album::new(album_name);
            if let Some(album_artist) = tags.album_artist {
                album = album.with_artist(Artist::new(album_artist));
            }
            if let Some(total) = tags.track_total {
                album = album.with_num_tracks(total);
            }
            track = track.with_album(album);
        }

        // Prefer a tagged date in catalogue shape, fall back to the year.
        let date = tags
            .date
            .filter(|d| is_partial_date(d))
            .or_else(|| tags.year.map(|year| format!("{year:04}")));
        if let Some(date) = date {
            track = track.with_date(date);
        }

        if let Some(duration_ms) = tags.duration_ms {
            track = track.with_length(duration_ms);
        }
        if let Some(track_number) = tags.track_number.filter(|&n| n > 0) {
            track = track.with_track_no(track_number);
        }
        track
    }

    fn extract_tags(path: &Path) -> std::result::Result<TagData, Box<dyn std::error::Error>> {
        let tagged_file = lofty::read_from_path(path)?;

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

        let properties = tagged_file.properties();

        let mut tag_data = TagData {
            duration_ms: u64::try_from(properties.duration().as_millis()).ok(),
            ..Default::default()
        };

        if let Some(tag) = tag {
            tag_data.title = tag.title().map(|s| s.to_string());
            tag_data.artist = tag.artist().map(|s| s.to_string());
            tag_data.album = tag.album().map(|s| s.to_string());
            tag_data.track_number = tag.track();
            tag_data.track_total = tag.track_total();
            tag_data.year = tag.year();

            tag_data.album_artist = tag
                .get_string(&lofty::prelude::ItemKey::AlbumArtist)
                .map(|s| s.to_string());
            tag_data.date = tag
                .get_string(&lofty::prelude::ItemKey::RecordingDate)
                .map(|s| s.to_string());
        }

        Ok(tag_data)
    }

    fn track_uri(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.media_dir).unwrap_or(path);
        format!("local:track:{}", relative.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(Scanner::is_audio_file(Path::new("/music/test.flac")));
        assert!(Scanner::is_audio_file(Path::new("/music/test.mp3")));
        assert!(Scanner::is_audio_file(Path::new("/music/test.OGG")));
        assert!(!Scanner::is_audio_file(Path::new("/music/test.txt")));
        assert!(!Scanner::is_audio_file(Path::new("/music/test")));
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = Scanner::new(temp_dir.path());
        let tracks = scanner.scan().unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_source_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = Scanner::new(temp_dir.path().join("missing"));

        assert!(matches!(
            scanner.scan(),
            Err(LibraryError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_scan_skips_non_audio_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("test.txt"), "not audio").unwrap();
        fs::write(temp_dir.path().join("readme.md"), "# README").unwrap();

        let scanner = Scanner::new(temp_dir.path());
        let tracks = scanner.scan().unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_scan_degrades_to_defaults_for_unreadable_tags() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.mp3"), "not really audio").unwrap();

        let scanner = Scanner::new(temp_dir.path());
        let tracks = scanner.scan().unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].uri, "local:track:broken.mp3");
        assert_eq!(tracks[0].name, "broken");
        assert!(tracks[0].artists.is_empty());
        assert!(tracks[0].album.is_none());
    }

    #[test]
    fn test_scan_visits_files_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.mp3"), "x").unwrap();
        fs::write(temp_dir.path().join("a.mp3"), "x").unwrap();

        let scanner = Scanner::new(temp_dir.path());
        let tracks = scanner.scan().unwrap();
        let uris: Vec<&str> = tracks.iter().map(|t| t.uri.as_str()).collect();
        assert_eq!(uris, ["local:track:a.mp3", "local:track:b.mp3"]);
    }
}
