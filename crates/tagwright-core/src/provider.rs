//! Provider identities and the provider-client seam.
//!
//! The core never talks to a catalog directly. A [`ProviderClient`] performs
//! the lookup (HTTP, replayed fixtures, ...) and reports the outcome as a
//! [`SearchOutcome`]; transport failures never reach the core as errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An external metadata catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// `MusicBrainz` recording search.
    MusicBrainz,
    /// Deezer track search.
    Deezer,
    /// Spotify track search.
    Spotify,
}

impl Provider {
    /// Every known provider, in declaration order.
    pub const ALL: [Self; 3] = [Self::MusicBrainz, Self::Deezer, Self::Spotify];

    /// The canonical lowercase name, used as store source name, mapping
    /// file name and CLI argument.
    pub fn name(self) -> &'static str {
        match self {
            Self::MusicBrainz => "musicbrainz",
            Self::Deezer => "deezer",
            Self::Spotify => "spotify",
        }
    }

    /// Parse a provider name (case-insensitive). `mb`, `dz` and `sp` are
    /// accepted as short aliases.
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(provider) = Self::ALL
            .into_iter()
            .find(|provider| provider.name().eq_ignore_ascii_case(name))
        {
            return Some(provider);
        }
        match name.to_ascii_lowercase().as_str() {
            "mb" => Some(Self::MusicBrainz),
            "dz" => Some(Self::Deezer),
            "sp" => Some(Self::Spotify),
            _ => None,
        }
    }

    /// The key under which this provider's search responses list their
    /// candidates (e.g. `recording-list` for MusicBrainz).
    pub fn result_list_key(self) -> &'static str {
        match self {
            Self::MusicBrainz => "recording-list",
            Self::Deezer => "data",
            Self::Spotify => "tracks.items",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The identity of one track lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackQuery {
    pub title: String,
    pub artist: String,

    /// Optional album filter.
    #[serde(default)]
    pub album: Option<String>,

    /// Extra provider-specific search parameters.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl TrackQuery {
    #[must_use]
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Result of asking a provider for candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// At least one candidate record, in provider order.
    Found(Vec<Value>),
    /// The provider answered but had no match.
    NotFound,
    /// The lookup failed (transport, auth, parse, ...).
    Failed(String),
}

impl SearchOutcome {
    /// Build an outcome from a candidate list, mapping an empty list to
    /// [`SearchOutcome::NotFound`].
    pub fn from_candidates(candidates: Vec<Value>) -> Self {
        if candidates.is_empty() {
            Self::NotFound
        } else {
            Self::Found(candidates)
        }
    }

    /// The candidates, if any were found.
    pub fn into_candidates(self) -> Option<Vec<Value>> {
        match self {
            Self::Found(candidates) if !candidates.is_empty() => Some(candidates),
            _ => None,
        }
    }
}

/// A synchronous catalog client.
///
/// Implementations catch and log their own transport errors and report them
/// as [`SearchOutcome::Failed`]. The core does not retry.
pub trait ProviderClient {
    /// Which catalog this client talks to.
    fn provider(&self) -> Provider;

    /// Search for candidate records matching the query.
    fn search_track(&self, query: &TrackQuery) -> SearchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_names_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(Provider::parse(provider.name()), Some(provider));
        }
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(Provider::MusicBrainz.name(), "musicbrainz");
        assert_eq!(Provider::Deezer.name(), "deezer");
        assert_eq!(Provider::Spotify.name(), "spotify");
    }

    #[test]
    fn test_provider_parse_case_insensitive() {
        assert_eq!(Provider::parse("MusicBrainz"), Some(Provider::MusicBrainz));
        assert_eq!(Provider::parse("DEEZER"), Some(Provider::Deezer));
    }

    #[test]
    fn test_provider_parse_aliases() {
        assert_eq!(Provider::parse("mb"), Some(Provider::MusicBrainz));
        assert_eq!(Provider::parse("DZ"), Some(Provider::Deezer));
        assert_eq!(Provider::parse("sp"), Some(Provider::Spotify));
    }

    #[test]
    fn test_provider_parse_unknown() {
        assert_eq!(Provider::parse("discogs"), None);
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(Provider::Spotify.to_string(), "spotify");
    }

    #[test]
    fn test_provider_serde_uses_lowercase_names() {
        let value = serde_json::to_value(Provider::MusicBrainz).unwrap();
        assert_eq!(value, json!("musicbrainz"));
    }

    #[test]
    fn test_track_query_builder() {
        let query = TrackQuery::new("Song", "Band")
            .with_album("Record")
            .with_param("limit", "10");

        assert_eq!(query.title, "Song");
        assert_eq!(query.artist, "Band");
        assert_eq!(query.album.as_deref(), Some("Record"));
        assert_eq!(query.extra.get("limit").map(String::as_str), Some("10"));
    }

    #[test]
    fn test_search_outcome_from_empty_candidates() {
        assert_eq!(SearchOutcome::from_candidates(Vec::new()), SearchOutcome::NotFound);
    }

    #[test]
    fn test_search_outcome_into_candidates() {
        let found = SearchOutcome::Found(vec![json!({"id": 1})]);
        assert_eq!(found.into_candidates(), Some(vec![json!({"id": 1})]));
        assert_eq!(SearchOutcome::Failed("timeout".to_string()).into_candidates(), None);
        assert_eq!(SearchOutcome::Found(Vec::new()).into_candidates(), None);
    }
}
