//! The tag-container capability and an in-memory implementation.
//!
//! A [`TagContainer`] is the local file's mutable tag set addressed by
//! canonical field names. Writing a field the container does not know is an
//! error; [`suggest_fields`] offers close matches for such names.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::mapping::CanonicalRecord;

/// Fields holding embedded image data. Their values are not stable across
/// reads, so they never take part in change detection.
pub const IMAGE_FIELDS: &[&str] = &["art", "images"];

/// The canonical tag vocabulary.
pub const CANONICAL_FIELDS: &[&str] = &[
    "title",
    "artist",
    "artists",
    "artist_sort",
    "artist_credit",
    "album",
    "albumartist",
    "albumartist_sort",
    "albumtype",
    "albumstatus",
    "media",
    "track",
    "tracktotal",
    "disc",
    "disctotal",
    "length",
    "date",
    "original_date",
    "year",
    "genre",
    "genres",
    "label",
    "isrc",
    "country",
    "url",
    "composer",
    "comments",
    "lyrics",
    "mb_trackid",
    "mb_releasetrackid",
    "mb_albumid",
    "mb_releasegroupid",
    "mb_artistid",
    "mb_albumartistid",
    "mb_workid",
    "art",
    "images",
];

/// Minimum normalized similarity for a field name suggestion.
const SUGGESTION_CUTOFF: f64 = 0.6;

/// Maximum number of suggestions returned.
const MAX_SUGGESTIONS: usize = 5;

/// Whether a field holds embedded image data.
pub fn is_image_field(field: &str) -> bool {
    IMAGE_FIELDS.contains(&field)
}

/// A mutable set of named tag fields backed by some storage.
pub trait TagContainer {
    /// Every field name this container accepts.
    fn known_fields(&self) -> Vec<&str>;

    /// Current value of a field, `None` when unset or unknown.
    fn get(&self, field: &str) -> Option<Value>;

    /// Set a field. `Value::Null` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for a field outside
    /// [`known_fields`](Self::known_fields) and [`Error::InvalidValue`] when
    /// the value cannot be stored in that field.
    fn set(&mut self, field: &str, value: Value) -> Result<()>;

    /// Persist the current fields to the underlying storage.
    fn save(&mut self) -> Result<()>;

    /// Clear every field in the underlying storage.
    fn delete(&mut self) -> Result<()>;

    /// Whether `field` is one of the container's fields.
    fn recognizes(&self, field: &str) -> bool {
        self.known_fields().contains(&field)
    }

    /// Snapshot of every known field, `null` for unset ones.
    fn as_dict(&self) -> CanonicalRecord {
        self.known_fields()
            .into_iter()
            .map(|field| (field.to_string(), self.get(field).unwrap_or(Value::Null)))
            .collect()
    }

    /// Set several fields at once, stopping at the first failure.
    fn update(&mut self, updates: &CanonicalRecord) -> Result<()> {
        for (field, value) in updates {
            self.set(field, value.clone())?;
        }
        Ok(())
    }
}

/// Close matches for `field` among `known`, best first.
///
/// Uses normalized Levenshtein similarity with a 0.6 cutoff and returns at
/// most five names.
pub fn suggest_fields(field: &str, known: &[&str]) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = known
        .iter()
        .map(|candidate| (strsim::normalized_levenshtein(field, candidate), *candidate))
        .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// A tag container held entirely in memory.
///
/// `save` records the current fields as the saved state; `delete` clears
/// both the live and the saved fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTags {
    fields: Vec<String>,
    values: CanonicalRecord,
    saved: CanonicalRecord,
    save_count: usize,
}

impl Default for MemoryTags {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTags {
    /// An empty container accepting the canonical vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fields(CANONICAL_FIELDS.iter().copied())
    }

    /// An empty container accepting exactly `fields`.
    #[must_use]
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            values: CanonicalRecord::new(),
            saved: CanonicalRecord::new(),
            save_count: 0,
        }
    }

    /// A container pre-populated with `record`, treated as already saved.
    ///
    /// # Errors
    ///
    /// Returns an error if `record` names a field outside the vocabulary.
    pub fn from_record(record: &CanonicalRecord) -> Result<Self> {
        let mut tags = Self::new();
        tags.update(record)?;
        tags.saved = tags.values.clone();
        Ok(tags)
    }

    /// Fields as of the last `save`.
    pub fn saved(&self) -> &CanonicalRecord {
        &self.saved
    }

    /// How many times `save` has run.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl TagContainer for MemoryTags {
    fn known_fields(&self) -> Vec<&str> {
        self.fields.iter().map(String::as_str).collect()
    }

    fn get(&self, field: &str) -> Option<Value> {
        self.values.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        if !self.recognizes(field) {
            return Err(Error::UnknownField {
                field: field.to_string(),
            });
        }

        if value.is_null() {
            self.values.remove(field);
        } else {
            self.values.insert(field.to_string(), value);
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.saved = self.values.clone();
        self.save_count += 1;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.values.clear();
        self.saved.clear();
        Ok(())
    }
}
