pub mod lookup;
pub mod query;
pub mod refresh;
pub mod scan;
pub mod status;

pub use lookup::run_lookup;
pub use query::{run_find, run_search};
pub use refresh::run_refresh;
pub use scan::run_scan;
pub use status::show_status;

use incipit_core::Track;

/// One-line rendering of a track for terminal output.
pub(crate) fn format_track(track: &Track) -> String {
    let artists = if track.artists.is_empty() {
        "unknown artist".to_string()
    } else {
        track
            .artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let album = track
        .album
        .as_ref()
        .map(|album| format!(" [{}]", album.name))
        .unwrap_or_default();
    let date = track
        .date
        .as_ref()
        .map(|date| format!(" ({date})"))
        .unwrap_or_default();

    format!("{artists} - {}{album}{date}  <{}>", track.name, track.uri)
}
