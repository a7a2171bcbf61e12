use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tagwright_core::TrackQuery;
use tagwright_etl::{Config, ReconciliationQuery, RecordedProvider};

use super::{parse_provider, print_json, tags};

/// What to look up and where the provider's answer comes from.
#[derive(Debug)]
pub struct LookupRequest {
    pub provider: String,
    pub response: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
}

pub fn run_lookup(
    config: &Config,
    request: &LookupRequest,
    apply: Option<&Path>,
    yes: bool,
) -> Result<()> {
    let provider = parse_provider(&request.provider)?;
    let client = RecordedProvider::new(provider, &request.response);
    let mut query = ReconciliationQuery::from_config(config)?;

    let mut track = TrackQuery::new(&request.title, &request.artist);
    if let Some(album) = &request.album {
        track = track.with_album(album);
    }

    let Some(records) = query.fetch_query(&client, &track) else {
        println!(
            "No {} results for {} - {}",
            provider, request.artist, request.title
        );
        return Ok(());
    };

    print_json(&Value::Array(
        records.iter().cloned().map(Value::Object).collect(),
    ))?;
    log::debug!("Stored results in {}", config.store_path.display());

    if let (Some(path), Some(best)) = (apply, records.first()) {
        println!();
        tags::apply_updates(path, best, yes)?;
    }

    Ok(())
}
