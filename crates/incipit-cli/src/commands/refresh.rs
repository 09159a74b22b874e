use anyhow::Result;
use std::sync::Arc;

use incipit_library::{Config, JsonCatalogue, Library};

pub async fn run_refresh(uri: Option<String>, config: &Config) -> Result<()> {
    log::info!("Refreshing from {}", config.catalogue_path.display());

    let catalogue = Arc::new(JsonCatalogue::new(config.catalogue_path.clone()));
    let library = Library::spawn(config.provider.as_str(), catalogue);

    library.refresh(uri.as_deref()).await?;

    match uri {
        Some(uri) => println!("✓ Refreshed {uri}"),
        None => println!("✓ Catalogue loads cleanly: {}", config.catalogue_path.display()),
    }

    library.close().await?;
    Ok(())
}
