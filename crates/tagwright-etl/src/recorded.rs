//! A provider client that replays saved search responses.
//!
//! The response file holds either a bare array of candidates or a provider
//! response object carrying the candidate list under the provider's list key
//! (`recording-list`, `data`, `tracks.items`). The query is not matched
//! against the candidates; the file is the answer.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tagwright_core::{Provider, ProviderClient, SearchOutcome, TrackQuery};

/// Replays one saved response for every search.
#[derive(Debug, Clone)]
pub struct RecordedProvider {
    provider: Provider,
    path: PathBuf,
}

impl RecordedProvider {
    pub fn new(provider: Provider, path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_response(&self) -> Result<Value, String> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| format!("cannot read {}: {}", self.path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("cannot decode {}: {}", self.path.display(), e))
    }
}

/// Pull the candidate list out of a provider response.
///
/// Returns `None` when the response is neither an array nor an object with
/// an array under `list_key` (a dotted path).
pub fn extract_candidates(response: Value, list_key: &str) -> Option<Vec<Value>> {
    let mut current = response;
    if current.is_object() {
        for segment in list_key.split('.') {
            current = match current {
                Value::Object(mut map) => map.remove(segment)?,
                _ => return None,
            };
        }
    }

    match current {
        Value::Array(candidates) => Some(candidates),
        _ => None,
    }
}

impl ProviderClient for RecordedProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn search_track(&self, query: &TrackQuery) -> SearchOutcome {
        log::debug!(
            "Replaying {} response from {} for {} - {}",
            self.provider,
            self.path.display(),
            query.artist,
            query.title
        );

        let response = match self.read_response() {
            Ok(response) => response,
            Err(reason) => return SearchOutcome::Failed(reason),
        };

        match extract_candidates(response, self.provider.result_list_key()) {
            Some(candidates) => SearchOutcome::from_candidates(candidates),
            None => SearchOutcome::Failed(format!(
                "{} has no '{}' list",
                self.path.display(),
                self.provider.result_list_key()
            )),
        }
    }
}
