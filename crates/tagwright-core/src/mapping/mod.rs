//! Field translation from provider paths to the canonical tag vocabulary.
//!
//! Each provider gets a declarative [`FieldMapping`]: a table from flat path
//! (see [`crate::flatten`]) to canonical field name. Translation walks a
//! [`FlatRecord`] in traversal order and copies every mapped value into a
//! [`CanonicalRecord`]. Unmapped paths are dropped.
//!
//! Several paths may map to the same canonical field. The value from the
//! last matching path in traversal order wins; the canonical key keeps the
//! position where it was first written.
//!
//! Tables ship built in (see [`tables`]) and can be replaced per provider by
//! a TOML file:
//!
//! ```toml
//! provider = "deezer"
//!
//! [fields]
//! "title" = "title"
//! "album.title" = "album"
//! ```

pub mod tables;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::flatten::FlatRecord;
use crate::provider::Provider;

/// Ordered mapping of canonical field name to value.
pub type CanonicalRecord = Map<String, Value>;

/// Canonical fields whose values are coerced to ISO dates.
pub const DATE_FIELDS: &[&str] = &["date", "original_date"];

/// A provider-specific table from flat path to canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// The provider whose response shape this table describes.
    pub provider: Provider,

    /// Flat path to canonical field name.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl FieldMapping {
    /// An empty table for a provider.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            fields: BTreeMap::new(),
        }
    }

    /// Build a table from `(flat path, canonical field)` pairs.
    #[must_use]
    pub fn from_pairs(provider: Provider, pairs: &[(&str, &str)]) -> Self {
        let fields = pairs
            .iter()
            .map(|&(path, field)| (path.to_string(), field.to_string()))
            .collect();
        Self { provider, fields }
    }

    /// The built-in table for a provider.
    #[must_use]
    pub fn builtin(provider: Provider) -> Self {
        let pairs = match provider {
            Provider::MusicBrainz => tables::MUSICBRAINZ,
            Provider::Deezer => tables::DEEZER,
            Provider::Spotify => tables::SPOTIFY,
        };
        Self::from_pairs(provider, pairs)
    }

    /// Load a table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mapping: Self = toml::from_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "failed to parse field mapping from {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(mapping)
    }

    /// Add or replace one entry.
    #[must_use]
    pub fn with_field(mut self, path: impl Into<String>, field: impl Into<String>) -> Self {
        self.fields.insert(path.into(), field.into());
        self
    }

    /// The canonical field a flat path maps to, if any.
    pub fn canonical_for(&self, path: &str) -> Option<&str> {
        self.fields.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Translate a flat record into canonical fields using `mapping`.
///
/// Values bound for a [`DATE_FIELDS`] entry are coerced with
/// [`coerce_date`]; a value that cannot be coerced is skipped for that path
/// with a warning and translation continues.
pub fn translate(flat: &FlatRecord, mapping: &FieldMapping) -> CanonicalRecord {
    let mut canonical = CanonicalRecord::new();

    for (path, value) in flat {
        let Some(field) = mapping.canonical_for(path) else {
            continue;
        };

        if is_date_field(field) {
            if let Some(date) = coerce_date(value) {
                canonical.insert(field.to_string(), Value::String(date));
            } else {
                log::warn!(
                    "Cannot convert {} at {} to a date for '{}' ({})",
                    value,
                    path,
                    field,
                    mapping.provider
                );
            }
            continue;
        }

        canonical.insert(field.to_string(), value.clone());
    }

    canonical
}

/// Whether a canonical field holds a date.
pub fn is_date_field(field: &str) -> bool {
    DATE_FIELDS.contains(&field)
}

/// Parse a date-like scalar as `YYYY-MM-DD`, falling back to a bare `YYYY`
/// (which becomes January 1st). Returns the ISO `YYYY-MM-DD` rendering.
pub fn coerce_date(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = text.parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }

    None
}

/// The active mapping table for every provider.
///
/// Starts from the built-in tables; an override replaces a provider's
/// table wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRegistry {
    musicbrainz: FieldMapping,
    deezer: FieldMapping,
    spotify: FieldMapping,
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MappingRegistry {
    /// A registry holding only the built-in tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            musicbrainz: FieldMapping::builtin(Provider::MusicBrainz),
            deezer: FieldMapping::builtin(Provider::Deezer),
            spotify: FieldMapping::builtin(Provider::Spotify),
        }
    }

    /// Load overrides from `<dir>/<provider>.toml` on top of the built-in
    /// tables. Providers without a file keep their built-in table.
    ///
    /// # Errors
    ///
    /// Returns an error if an override file exists but cannot be parsed, or
    /// if it declares a different provider than its file name.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::builtin();

        for provider in Provider::ALL {
            let path = dir.join(format!("{}.toml", provider.name()));
            if !path.exists() {
                continue;
            }

            let mapping = FieldMapping::load(&path)?;
            if mapping.provider != provider {
                return Err(Error::InvalidData(format!(
                    "{} declares provider '{}', expected '{}'",
                    path.display(),
                    mapping.provider,
                    provider
                )));
            }

            log::info!(
                "Loaded {} field mappings for {} from {}",
                mapping.len(),
                provider,
                path.display()
            );
            registry.set(mapping);
        }

        Ok(registry)
    }

    /// Replace the table for `mapping.provider`.
    pub fn set(&mut self, mapping: FieldMapping) {
        match mapping.provider {
            Provider::MusicBrainz => self.musicbrainz = mapping,
            Provider::Deezer => self.deezer = mapping,
            Provider::Spotify => self.spotify = mapping,
        }
    }

    /// The active table for a provider.
    pub fn mapping_for(&self, provider: Provider) -> &FieldMapping {
        match provider {
            Provider::MusicBrainz => &self.musicbrainz,
            Provider::Deezer => &self.deezer,
            Provider::Spotify => &self.spotify,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use serde_json::json;
    use std::io::Write;

    fn flat_from(value: &Value) -> FlatRecord {
        flatten(value)
    }

    #[test]
    fn test_translate_end_to_end_release() {
        let raw = json!({
            "release-list": [{"title": "Album A", "artist-credit": [{"name": "Artist A"}]}]
        });
        let mapping = FieldMapping::from_pairs(
            Provider::MusicBrainz,
            &[
                ("release-list[0].title", "album"),
                ("release-list[0].artist-credit[0].name", "albumartist"),
            ],
        );

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(
            Value::Object(canonical),
            json!({"album": "Album A", "albumartist": "Artist A"})
        );
    }

    #[test]
    fn test_translate_last_matching_path_wins() {
        let raw = json!({"a": {"b": "first"}, "c": {"d": "second"}});
        let mapping = FieldMapping::from_pairs(Provider::Deezer, &[("a.b", "X"), ("c.d", "X")]);

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(canonical["X"], json!("second"));
    }

    #[test]
    fn test_translate_tie_break_follows_traversal_not_table_order() {
        // Table order is irrelevant; only the record's traversal order counts.
        let raw = json!({"c": {"d": "early"}, "a": {"b": "late"}});
        let mapping = FieldMapping::from_pairs(Provider::Deezer, &[("a.b", "X"), ("c.d", "X")]);

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(canonical["X"], json!("late"));
    }

    #[test]
    fn test_translate_key_keeps_first_position() {
        let raw = json!({"t1": "one", "alb": "Album", "t2": "two"});
        let mapping = FieldMapping::from_pairs(
            Provider::Spotify,
            &[("t1", "title"), ("alb", "album"), ("t2", "title")],
        );

        let canonical = translate(&flat_from(&raw), &mapping);

        let keys: Vec<&str> = canonical.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "album"]);
        assert_eq!(canonical["title"], json!("two"));
    }

    #[test]
    fn test_translate_drops_unmapped_paths() {
        let raw = json!({"title": "Song", "preview": "https://cdn/x.mp3"});
        let mapping = FieldMapping::from_pairs(Provider::Deezer, &[("title", "title")]);

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(canonical.len(), 1);
        assert!(!canonical.contains_key("preview"));
    }

    #[test]
    fn test_translate_is_idempotent() {
        let raw = json!({
            "title": "Song",
            "release_date": "2001-02-03",
            "artist": {"name": "Band"}
        });
        let flat = flat_from(&raw);
        let mapping = FieldMapping::builtin(Provider::Deezer);

        assert_eq!(translate(&flat, &mapping), translate(&flat, &mapping));
    }

    #[test]
    fn test_translate_musicbrainz_release_event_fields() {
        let raw = json!({
            "id": "r",
            "title": "S",
            "length": "215000",
            "release-list": [{
                "title": "A",
                "release-event-list": [{"date": "1998-05-01", "area": {"name": "UK"}}]
            }]
        });

        let canonical = translate(&flat_from(&raw), &FieldMapping::builtin(Provider::MusicBrainz));

        assert_eq!(canonical["date"], json!("1998-05-01"));
        assert_eq!(canonical["country"], json!("UK"));
        assert_eq!(canonical["length"], json!("215000"));
        assert_eq!(canonical["album"], json!("A"));
    }

    #[test]
    fn test_translate_coerces_full_date() {
        let raw = json!({"release_date": "2001-02-03"});
        let mapping = FieldMapping::from_pairs(Provider::Deezer, &[("release_date", "date")]);

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(canonical["date"], json!("2001-02-03"));
    }

    #[test]
    fn test_translate_coerces_year_only_date() {
        let raw = json!({"date": "1998"});
        let mapping = FieldMapping::from_pairs(Provider::MusicBrainz, &[("date", "date")]);

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(canonical["date"], json!("1998-01-01"));
    }

    #[test]
    fn test_translate_skips_unparseable_date_and_continues() {
        let raw = json!({"date": "sometime in May", "title": "Song"});
        let mapping = FieldMapping::from_pairs(
            Provider::MusicBrainz,
            &[("date", "date"), ("title", "title")],
        );

        let canonical = translate(&flat_from(&raw), &mapping);

        assert!(!canonical.contains_key("date"));
        assert_eq!(canonical["title"], json!("Song"));
    }

    #[test]
    fn test_translate_bad_later_date_keeps_earlier_value() {
        let raw = json!({"album": {"release_date": "2001-02-03"}, "release_date": "0000-00-00"});
        let mapping = FieldMapping::from_pairs(
            Provider::Deezer,
            &[("album.release_date", "date"), ("release_date", "date")],
        );

        let canonical = translate(&flat_from(&raw), &mapping);

        assert_eq!(canonical["date"], json!("2001-02-03"));
    }

    #[test]
    fn test_coerce_date_variants() {
        assert_eq!(coerce_date(&json!("2020-12-31")), Some("2020-12-31".to_string()));
        assert_eq!(coerce_date(&json!(" 1977 ")), Some("1977-01-01".to_string()));
        assert_eq!(coerce_date(&json!(1984)), Some("1984-01-01".to_string()));
        assert_eq!(coerce_date(&json!("1998-03")), None);
        assert_eq!(coerce_date(&json!("2020-02-30")), None);
        assert_eq!(coerce_date(&Value::Null), None);
        assert_eq!(coerce_date(&json!(["2020"])), None);
    }

    #[test]
    fn test_is_date_field() {
        assert!(is_date_field("date"));
        assert!(is_date_field("original_date"));
        assert!(!is_date_field("year"));
    }

    #[test]
    fn test_field_mapping_with_field_and_lookup() {
        let mapping = FieldMapping::new(Provider::Spotify).with_field("name", "title");
        assert_eq!(mapping.canonical_for("name"), Some("title"));
        assert_eq!(mapping.canonical_for("album.name"), None);
        assert_eq!(mapping.len(), 1);
        assert!(!mapping.is_empty());
    }

    #[test]
    fn test_builtin_tables_are_not_empty() {
        for provider in Provider::ALL {
            let mapping = FieldMapping::builtin(provider);
            assert_eq!(mapping.provider, provider);
            assert!(!mapping.is_empty());
        }
    }

    #[test]
    fn test_load_from_toml() {
        let toml_content = r#"
provider = "deezer"

[fields]
"title" = "title"
"album.title" = "album"
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deezer.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let mapping = FieldMapping::load(&path).unwrap();

        assert_eq!(mapping.provider, Provider::Deezer);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.canonical_for("album.title"), Some("album"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "provider = [unclosed").unwrap();

        let result = FieldMapping::load(&path);

        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = FieldMapping::load(Path::new("/nonexistent/mapping.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_registry_defaults_to_builtin() {
        let registry = MappingRegistry::default();
        assert_eq!(
            registry.mapping_for(Provider::Deezer),
            &FieldMapping::builtin(Provider::Deezer)
        );
    }

    #[test]
    fn test_registry_load_dir_overrides_one_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("spotify.toml"),
            "provider = \"spotify\"\n\n[fields]\n\"name\" = \"title\"\n",
        )
        .unwrap();

        let registry = MappingRegistry::load_dir(dir.path()).unwrap();

        assert_eq!(registry.mapping_for(Provider::Spotify).len(), 1);
        assert_eq!(
            registry.mapping_for(Provider::MusicBrainz),
            &FieldMapping::builtin(Provider::MusicBrainz)
        );
    }

    #[test]
    fn test_registry_load_dir_rejects_mismatched_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("deezer.toml"),
            "provider = \"spotify\"\n\n[fields]\n",
        )
        .unwrap();

        let result = MappingRegistry::load_dir(dir.path());

        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_registry_set_replaces_table() {
        let mut registry = MappingRegistry::builtin();
        registry.set(FieldMapping::new(Provider::MusicBrainz));
        assert!(registry.mapping_for(Provider::MusicBrainz).is_empty());
    }
}
