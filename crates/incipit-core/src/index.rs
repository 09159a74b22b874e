//! Immutable index snapshots and the matching engine.
//!
//! An [`Index`] is built once from the catalogue's ordered track sequence
//! and never mutated; the library service publishes a fresh snapshot on
//! every refresh, so readers of an old snapshot always see consistent data.

use std::collections::HashMap;

use crate::model::Track;
use crate::query::{Query, Term};

/// Per-field inverted indexes for exact (case-sensitive) matching.
///
/// Each map goes from a projection value to the track positions carrying
/// it, in catalogue order. `albumartist` unions a track's own artists with
/// its album's artists.
#[derive(Debug, Default)]
struct ExactIndexes {
    track: HashMap<String, Vec<usize>>,
    artist: HashMap<String, Vec<usize>>,
    album: HashMap<String, Vec<usize>>,
    albumartist: HashMap<String, Vec<usize>>,
    date: HashMap<String, Vec<usize>>,
    uri: HashMap<String, Vec<usize>>,
    track_no: HashMap<u32, Vec<usize>>,
}

/// An immutable, searchable snapshot of the catalogue.
#[derive(Debug)]
pub struct Index {
    tracks: Vec<Track>,
    by_uri: HashMap<String, Vec<usize>>,
    exact: ExactIndexes,
}

impl Index {
    /// Build a snapshot from tracks in catalogue order.
    ///
    /// Records with an empty uri cannot be addressed and are skipped with a
    /// warning. Duplicate uris are preserved in order; the catalogue is the
    /// source of truth. Building never fails for business-data reasons.
    #[must_use]
    pub fn build(tracks: Vec<Track>) -> Self {
        let mut kept = Vec::with_capacity(tracks.len());
        for track in tracks {
            if track.uri.is_empty() {
                log::warn!("Skipping catalogue record with empty uri: {:?}", track.name);
                continue;
            }
            kept.push(track);
        }

        let mut by_uri: HashMap<String, Vec<usize>> = HashMap::new();
        let mut exact = ExactIndexes::default();
        for (pos, track) in kept.iter().enumerate() {
            by_uri.entry(track.uri.clone()).or_default().push(pos);

            push_position(&mut exact.track, &track.name, pos);
            push_position(&mut exact.uri, &track.uri, pos);
            for artist in &track.artists {
                push_position(&mut exact.artist, &artist.name, pos);
                push_position(&mut exact.albumartist, &artist.name, pos);
            }
            if let Some(album) = &track.album {
                push_position(&mut exact.album, &album.name, pos);
                for artist in &album.artists {
                    push_position(&mut exact.albumartist, &artist.name, pos);
                }
            }
            if let Some(date) = &track.date {
                push_position(&mut exact.date, date, pos);
            }
            if let Some(track_no) = track.track_no {
                exact.track_no.entry(track_no).or_default().push(pos);
            }
        }

        Self {
            tracks: kept,
            by_uri,
            exact,
        }
    }

    /// Number of indexed tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The indexed tracks, in catalogue order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// All tracks registered under `uri`, in catalogue order.
    ///
    /// An unknown uri yields an empty sequence, never an error.
    #[must_use]
    pub fn lookup(&self, uri: &str) -> Vec<Track> {
        self.by_uri
            .get(uri)
            .map(|positions| positions.iter().map(|&pos| self.tracks[pos].clone()).collect())
            .unwrap_or_default()
    }

    /// Tracks whose projections exactly equal every term of `query`.
    ///
    /// Comparison is case-sensitive whole-string equality, or exact integer
    /// equality for `track_no`. Values within a field are OR-combined,
    /// fields AND-combined; results keep catalogue order.
    #[must_use]
    pub fn find_exact(&self, query: &Query) -> Vec<Track> {
        let mut matched: Option<Vec<usize>> = None;
        for term in query.terms() {
            let positions = self.exact_positions(term);
            matched = Some(match matched {
                None => positions,
                Some(previous) => intersect(&previous, &positions),
            });
            if matched.as_ref().is_some_and(Vec::is_empty) {
                break;
            }
        }
        matched
            .unwrap_or_default()
            .into_iter()
            .map(|pos| self.tracks[pos].clone())
            .collect()
    }

    /// Tracks matching every term of `query` under fuzzy comparison.
    ///
    /// Fuzzy comparison is case-insensitive substring containment, except
    /// `date`, which is case-insensitive prefix containment (a bare year
    /// matches a full date), and `track_no`, which stays exact integer
    /// equality. Results keep catalogue order.
    #[must_use]
    pub fn search(&self, query: &Query) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|track| query.terms().iter().all(|term| term_matches(track, term)))
            .cloned()
            .collect()
    }

    /// Catalogue positions whose projection for `term`'s field equals any
    /// of its values, ascending.
    fn exact_positions(&self, term: &Term) -> Vec<usize> {
        match term {
            Term::Track(values) => positions_union(&self.exact.track, values),
            Term::Artist(values) => positions_union(&self.exact.artist, values),
            Term::Album(values) => positions_union(&self.exact.album, values),
            Term::AlbumArtist(values) => positions_union(&self.exact.albumartist, values),
            Term::Date(values) => positions_union(&self.exact.date, values),
            Term::Uri(values) => positions_union(&self.exact.uri, values),
            Term::TrackNo(values) => {
                let mut positions: Vec<usize> = values
                    .iter()
                    .filter_map(|&value| u32::try_from(value).ok())
                    .filter_map(|value| self.exact.track_no.get(&value))
                    .flatten()
                    .copied()
                    .collect();
                positions.sort_unstable();
                positions.dedup();
                positions
            }
            // The fixed projection list behind `any`: track name, artist
            // names, album name, album artist names, date, uri.
            Term::Any(values) => {
                let mut positions = Vec::new();
                for map in [
                    &self.exact.track,
                    &self.exact.artist,
                    &self.exact.album,
                    &self.exact.albumartist,
                    &self.exact.date,
                    &self.exact.uri,
                ] {
                    for value in values {
                        if let Some(found) = map.get(value.as_str()) {
                            positions.extend_from_slice(found);
                        }
                    }
                }
                positions.sort_unstable();
                positions.dedup();
                positions
            }
        }
    }
}

/// Append `pos` under `key`, collapsing repeats from one track (a track may
/// project the same artist name twice).
fn push_position(map: &mut HashMap<String, Vec<usize>>, key: &str, pos: usize) {
    let positions = map.entry(key.to_string()).or_default();
    if positions.last() != Some(&pos) {
        positions.push(pos);
    }
}

/// Union of the positions registered under each value, ascending.
fn positions_union(map: &HashMap<String, Vec<usize>>, values: &[String]) -> Vec<usize> {
    let mut positions: Vec<usize> = values
        .iter()
        .filter_map(|value| map.get(value.as_str()))
        .flatten()
        .copied()
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Intersection of two ascending position lists, ascending.
fn intersect(left: &[usize], right: &[usize]) -> Vec<usize> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn term_matches(track: &Track, term: &Term) -> bool {
    match term {
        Term::Track(values) => values.iter().any(|v| folded_contains(&track.name, v)),
        Term::Artist(values) => track
            .artists
            .iter()
            .any(|artist| values.iter().any(|v| folded_contains(&artist.name, v))),
        Term::Album(values) => track
            .album
            .as_ref()
            .is_some_and(|album| values.iter().any(|v| folded_contains(&album.name, v))),
        Term::AlbumArtist(values) => {
            let album_artists = track.album.iter().flat_map(|album| album.artists.iter());
            track
                .artists
                .iter()
                .chain(album_artists)
                .any(|artist| values.iter().any(|v| folded_contains(&artist.name, v)))
        }
        Term::Date(values) => track
            .date
            .as_ref()
            .is_some_and(|date| values.iter().any(|v| folded_prefix(date, v))),
        Term::TrackNo(values) => track
            .track_no
            .is_some_and(|track_no| values.iter().any(|&v| i64::from(track_no) == v)),
        Term::Uri(values) => values.iter().any(|v| folded_contains(&track.uri, v)),
        Term::Any(values) => values.iter().any(|v| any_projection_contains(track, v)),
    }
}

/// Substring match over every textual projection of `track`, for `any`.
fn any_projection_contains(track: &Track, value: &str) -> bool {
    folded_contains(&track.name, value)
        || track
            .artists
            .iter()
            .any(|artist| folded_contains(&artist.name, value))
        || track.album.as_ref().is_some_and(|album| {
            folded_contains(&album.name, value)
                || album
                    .artists
                    .iter()
                    .any(|artist| folded_contains(&artist.name, value))
        })
        || track
            .date
            .as_ref()
            .is_some_and(|date| folded_contains(date, value))
        || folded_contains(&track.uri, value)
}

fn folded_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn folded_prefix(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().starts_with(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Album, Artist};
    use crate::query::Query;

    fn fixture() -> Vec<Track> {
        vec![
            Track::new("local:track:path1", "track1")
                .with_artist(Artist::new("artist1"))
                .with_album(Album::new("album1").with_artist(Artist::new("artist1")))
                .with_date("2001-02-03")
                .with_length(4000)
                .with_track_no(1),
            Track::new("local:track:path2", "track2")
                .with_artist(Artist::new("artist2"))
                .with_album(Album::new("album2").with_artist(Artist::new("artist2")))
                .with_date("2002")
                .with_length(4000)
                .with_track_no(2),
            Track::new("local:track:path3", "track3")
                .with_artist(Artist::new("artist4"))
                .with_album(Album::new("album3").with_artist(Artist::new("artist3")))
                .with_date("2003")
                .with_length(4000)
                .with_track_no(3),
        ]
    }

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_build_skips_records_with_empty_uri() {
        let mut tracks = fixture();
        tracks.push(Track::new("", "nameless"));

        let index = Index::build(tracks);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_lookup_returns_tracks_in_catalogue_order() {
        let index = Index::build(fixture());
        let found = index.lookup("local:track:path2");
        assert_eq!(names(&found), ["track2"]);
    }

    #[test]
    fn test_lookup_unknown_uri_is_empty() {
        let index = Index::build(fixture());
        assert!(index.lookup("local:track:missing").is_empty());
    }

    #[test]
    fn test_lookup_preserves_duplicate_uris() {
        let mut tracks = fixture();
        tracks.push(Track::new("local:track:path1", "track1 again"));

        let index = Index::build(tracks);
        let found = index.lookup("local:track:path1");
        assert_eq!(names(&found), ["track1", "track1 again"]);
    }

    #[test]
    fn test_find_exact_date_requires_full_string() {
        let index = Index::build(fixture());

        let year = Query::from_pairs([("date", vec!["2001"])]).unwrap();
        assert!(index.find_exact(&year).is_empty());

        let full = Query::from_pairs([("date", vec!["2001-02-03"])]).unwrap();
        assert_eq!(names(&index.find_exact(&full)), ["track1"]);
    }

    #[test]
    fn test_find_exact_is_case_sensitive() {
        let index = Index::build(fixture());
        let query = Query::from_pairs([("track", vec!["Track1"])]).unwrap();
        assert!(index.find_exact(&query).is_empty());
    }

    #[test]
    fn test_find_exact_track_no() {
        let index = Index::build(fixture());
        let query = Query::from_pairs([("track_no", vec!["2"])]).unwrap();
        assert_eq!(names(&index.find_exact(&query)), ["track2"]);
    }

    #[test]
    fn test_find_exact_albumartist_covers_both_artist_sets() {
        let index = Index::build(fixture());

        // artist3 appears only as an album artist.
        let album_side = Query::from_pairs([("albumartist", vec!["artist3"])]).unwrap();
        assert_eq!(names(&index.find_exact(&album_side)), ["track3"]);

        // artist4 appears only as a track artist.
        let track_side = Query::from_pairs([("albumartist", vec!["artist4"])]).unwrap();
        assert_eq!(names(&index.find_exact(&track_side)), ["track3"]);
    }

    #[test]
    fn test_find_exact_any_covers_date_and_uri() {
        let index = Index::build(fixture());

        let by_date = Query::from_pairs([("any", vec!["2002"])]).unwrap();
        assert_eq!(names(&index.find_exact(&by_date)), ["track2"]);

        let by_uri = Query::from_pairs([("any", vec!["local:track:path3"])]).unwrap();
        assert_eq!(names(&index.find_exact(&by_uri)), ["track3"]);
    }

    #[test]
    fn test_values_within_a_field_are_or_combined() {
        let index = Index::build(fixture());
        let query = Query::from_pairs([("track", vec!["track1", "track3"])]).unwrap();
        assert_eq!(names(&index.find_exact(&query)), ["track1", "track3"]);
    }

    #[test]
    fn test_fields_are_and_combined() {
        let index = Index::build(fixture());

        let hit = Query::from_pairs([("artist", vec!["artist1"]), ("date", vec!["2001-02-03"])])
            .unwrap();
        assert_eq!(names(&index.find_exact(&hit)), ["track1"]);

        let miss =
            Query::from_pairs([("artist", vec!["artist1"]), ("date", vec!["2002"])]).unwrap();
        assert!(index.find_exact(&miss).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let index = Index::build(fixture());

        let query = Query::from_pairs([("uri", vec!["TH1"])]).unwrap();
        assert_eq!(names(&index.search(&query)), ["track1"]);

        let query = Query::from_pairs([("track", vec!["Rack1"])]).unwrap();
        assert_eq!(names(&index.search(&query)), ["track1"]);
    }

    #[test]
    fn test_search_date_is_prefix_only() {
        let index = Index::build(fixture());

        let year = Query::from_pairs([("date", vec!["2001"])]).unwrap();
        assert_eq!(names(&index.search(&year)), ["track1"]);

        // A substring that is not a prefix does not match.
        let infix = Query::from_pairs([("date", vec!["02-03"])]).unwrap();
        assert!(index.search(&infix).is_empty());

        let wrong_day = Query::from_pairs([("date", vec!["2001-02-04"])]).unwrap();
        assert!(index.search(&wrong_day).is_empty());
    }

    #[test]
    fn test_search_results_keep_catalogue_order() {
        let index = Index::build(fixture());
        let query = Query::from_pairs([("track", vec!["track"])]).unwrap();
        assert_eq!(names(&index.search(&query)), ["track1", "track2", "track3"]);
    }

    #[test]
    fn test_exact_matches_are_a_subset_of_search_matches() {
        let index = Index::build(fixture());
        let query = Query::from_pairs([("artist", vec!["artist1"])]).unwrap();

        let exact = index.find_exact(&query);
        let fuzzy = index.search(&query);
        assert!(exact.iter().all(|track| fuzzy.contains(track)));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let index = Index::build(fixture());
        let query = Query::from_pairs([("any", vec!["artist"])]).unwrap();

        assert_eq!(index.search(&query), index.search(&query));
        assert_eq!(index.find_exact(&query), index.find_exact(&query));
    }
}
