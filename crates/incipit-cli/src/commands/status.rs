use anyhow::Result;
use std::collections::HashSet;

use incipit_library::{CatalogueReader, Config, JsonCatalogue, LibraryError};

pub fn show_status(config: &Config) -> Result<()> {
    let catalogue = JsonCatalogue::new(config.catalogue_path.clone());

    println!("\n📊 Incipit Status\n");
    println!("  Catalogue: {}", config.catalogue_path.display());

    match catalogue.load() {
        Ok(tracks) => {
            let albums: HashSet<&str> = tracks
                .iter()
                .filter_map(|track| track.album.as_ref())
                .map(|album| album.name.as_str())
                .collect();
            let artists: HashSet<&str> = tracks
                .iter()
                .flat_map(|track| track.artists.iter())
                .map(|artist| artist.name.as_str())
                .collect();

            println!("  Tracks: {}", tracks.len());
            println!("  Albums: {}", albums.len());
            println!("  Artists: {}", artists.len());
        }
        Err(LibraryError::SourceUnavailable { reason, .. }) => {
            println!("  ✗ Unavailable: {reason}");
            println!("\n  Run `incipit scan <music-dir>` to build the catalogue");
        }
        Err(other) => return Err(other.into()),
    }

    Ok(())
}
