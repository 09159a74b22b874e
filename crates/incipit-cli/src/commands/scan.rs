use anyhow::{Context, Result};
use std::path::PathBuf;

use incipit_library::{Config, JsonCatalogue, Scanner};

pub async fn run_scan(path: Option<PathBuf>, config: &Config) -> Result<()> {
    let media_dir = path
        .or_else(|| config.media_dir.clone())
        .context("No media directory given; pass a path or set media_dir in the config")?;

    log::info!("Starting scan of {}", media_dir.display());
    println!("  ⏳ Scanning {}", media_dir.display());

    // Tag extraction is blocking file IO; keep it off the async runtime.
    let scanner = Scanner::new(media_dir);
    let tracks = tokio::task::spawn_blocking(move || scanner.scan()).await??;

    let catalogue = JsonCatalogue::new(config.catalogue_path.clone());
    catalogue.write(&tracks)?;
    println!("  ✓ {} tracks catalogued", tracks.len());

    println!("\n✓ Scan complete: {}", catalogue.path().display());
    Ok(())
}
