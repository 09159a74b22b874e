use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use incipit_library::config::{self, Config};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "incipit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the catalogue file (default: ~/.local/share/incipit/catalogue.jsonl)
    #[arg(long, global = true)]
    catalogue: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Scan a music directory and write the catalogue
    ///
    /// Recursively walks the specified directory to discover audio files and
    /// extract their metadata. For each audio file found:
    ///
    /// - Extracts embedded tags (title, artist, album, album artist, track
    ///   number, date)
    /// - Derives a stable local:track:<relative-path> uri from its location
    ///   under the media directory
    /// - Writes one JSON record to the catalogue file
    ///
    /// Supported formats: FLAC, MP3, OGG/OPUS, WAV, M4A/AAC, AIFF
    ///
    /// Files whose tags cannot be read are still catalogued, with a name
    /// derived from the file name, so the catalogue never loses sight of a
    /// file.
    ///
    /// The catalogue is rewritten from scratch on every scan. Use
    /// `incipit status` to view catalogue statistics afterwards.
    Scan {
        /// Path to the music directory (default: media_dir from the config file)
        path: Option<PathBuf>,
    },
    /// Reload the catalogue into a fresh index
    Refresh {
        /// Restrict the refresh to a single track uri
        #[arg(long)]
        uri: Option<String>,
    },
    /// Show every catalogue record registered under a uri
    Lookup {
        /// Track uri, e.g. local:track:blue.flac
        uri: String,
    },
    /// Query the index with exact whole-string matching
    ///
    /// Terms are field=value pairs. Recognized fields: track, artist, album,
    /// albumartist, date, track_no, uri, any. Repeating a field matches any
    /// of its values; distinct fields must all match.
    ///
    /// Example: incipit find artist="Miles Davis" date=1959-08-17
    Find {
        /// field=value terms
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Query the index with case-insensitive substring matching
    ///
    /// Takes the same field=value terms as `find`, but values match as
    /// substrings anywhere in the field (dates match as prefixes, so a bare
    /// year finds full dates; track_no stays exact).
    ///
    /// Example: incipit search any=miles
    Search {
        /// field=value terms
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Show catalogue statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if config::ensure_config_file()? {
        log::info!(
            "Created default config at {}",
            config::config_file_path().display()
        );
    }

    let config = match cli.catalogue {
        Some(path) => Config::load_with_catalogue_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Scan { path } => {
            commands::run_scan(path, &config).await?;
        }
        Commands::Refresh { uri } => {
            commands::run_refresh(uri, &config).await?;
        }
        Commands::Lookup { uri } => {
            commands::run_lookup(uri, &config).await?;
        }
        Commands::Find { terms } => {
            commands::run_find(terms, &config).await?;
        }
        Commands::Search { terms } => {
            commands::run_search(terms, &config).await?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
    }

    Ok(())
}
