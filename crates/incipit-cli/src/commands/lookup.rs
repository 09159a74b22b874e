use anyhow::Result;
use std::sync::Arc;

use incipit_library::{Config, JsonCatalogue, Library};

use super::format_track;

pub async fn run_lookup(uri: String, config: &Config) -> Result<()> {
    let catalogue = Arc::new(JsonCatalogue::new(config.catalogue_path.clone()));
    let library = Library::spawn(config.provider.as_str(), catalogue);
    library.refresh(None).await?;

    let tracks = library.lookup(&uri).await?;
    if tracks.is_empty() {
        println!("No tracks registered under {uri}");
    } else {
        for track in &tracks {
            println!("  {}", format_track(track));
        }
    }

    library.close().await?;
    Ok(())
}
