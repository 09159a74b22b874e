use anyhow::{anyhow, Result};
use std::sync::Arc;

use incipit_core::Query;
use incipit_library::{Config, JsonCatalogue, Library};

use super::format_track;

pub async fn run_find(terms: Vec<String>, config: &Config) -> Result<()> {
    run_query(terms, config, true).await
}

pub async fn run_search(terms: Vec<String>, config: &Config) -> Result<()> {
    run_query(terms, config, false).await
}

async fn run_query(terms: Vec<String>, config: &Config, exact: bool) -> Result<()> {
    let query = parse_terms(&terms)?;

    let catalogue = Arc::new(JsonCatalogue::new(config.catalogue_path.clone()));
    let library = Library::spawn(config.provider.as_str(), catalogue);
    library.refresh(None).await?;

    let results = if exact {
        library.find_exact(query).await?
    } else {
        library.search(query).await?
    };

    for result in &results {
        println!("\n{} matches from {}:", result.tracks.len(), result.provider);
        for track in &result.tracks {
            println!("  {}", format_track(track));
        }
    }

    library.close().await?;
    Ok(())
}

/// Parse `field=value` command line terms into a query.
///
/// Repeats of the same field are merged into one OR-combined value list,
/// in first-appearance order.
fn parse_terms(terms: &[String]) -> Result<Query> {
    let mut pairs: Vec<(String, Vec<String>)> = Vec::new();
    for term in terms {
        let (field, value) = term
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected field=value, got {term:?}"))?;
        match pairs.iter_mut().find(|(name, _)| name.as_str() == field) {
            Some((_, values)) => values.push(value.to_string()),
            None => pairs.push((field.to_string(), vec![value.to_string()])),
        }
    }
    Ok(Query::from_pairs(pairs)?)
}
