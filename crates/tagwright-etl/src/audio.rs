//! Audio-file tag container backed by lofty.
//!
//! [`AudioTags`] reads the file's primary tag once, lets a
//! [`TagTransaction`](tagwright_core::TagTransaction) edit it in memory by
//! canonical field name, and writes it back on `save`.

use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagExt, TagType};
use serde_json::Value;
use tagwright_core::tags::is_image_field;
use tagwright_core::{Error, Result, TagContainer};

use crate::error::{TagError, TagResult};

/// Canonical fields an audio file can carry, in display order.
pub const AUDIO_FIELDS: &[&str] = &[
    "title",
    "artist",
    "artist_sort",
    "album",
    "albumartist",
    "albumartist_sort",
    "track",
    "tracktotal",
    "disc",
    "disctotal",
    "date",
    "original_date",
    "genre",
    "label",
    "isrc",
    "media",
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

/// Fields stored as plain positive integers.
const NUMERIC_FIELDS: &[&str] = &["track", "tracktotal", "disc", "disctotal"];

/// Separator used when a list value is written to a single text item.
const LIST_SEPARATOR: &str = "; ";

/// Map a canonical field name to the tag item holding it.
pub fn item_key(field: &str) -> Option<ItemKey> {
    match field {
        "title" => Some(ItemKey::TrackTitle),
        "artist" => Some(ItemKey::TrackArtist),
        "artist_sort" => Some(ItemKey::TrackArtistSortOrder),
        "album" => Some(ItemKey::AlbumTitle),
        "albumartist" => Some(ItemKey::AlbumArtist),
        "albumartist_sort" => Some(ItemKey::AlbumArtistSortOrder),
        "track" => Some(ItemKey::TrackNumber),
        "tracktotal" => Some(ItemKey::TrackTotal),
        "disc" => Some(ItemKey::DiscNumber),
        "disctotal" => Some(ItemKey::DiscTotal),
        "date" => Some(ItemKey::RecordingDate),
        "original_date" => Some(ItemKey::OriginalReleaseDate),
        "genre" => Some(ItemKey::Genre),
        "label" => Some(ItemKey::Label),
        "isrc" => Some(ItemKey::Isrc),
        "media" => Some(ItemKey::OriginalMediaType),
        "composer" => Some(ItemKey::Composer),
        "comments" => Some(ItemKey::Comment),
        "lyrics" => Some(ItemKey::Lyrics),
        "mb_trackid" => Some(ItemKey::MusicBrainzRecordingId),
        "mb_releasetrackid" => Some(ItemKey::MusicBrainzTrackId),
        "mb_albumid" => Some(ItemKey::MusicBrainzReleaseId),
        "mb_releasegroupid" => Some(ItemKey::MusicBrainzReleaseGroupId),
        "mb_artistid" => Some(ItemKey::MusicBrainzArtistId),
        "mb_albumartistid" => Some(ItemKey::MusicBrainzReleaseArtistId),
        "mb_workid" => Some(ItemKey::MusicBrainzWorkId),
        _ => None,
    }
}

/// The primary tag of one audio file.
#[derive(Clone)]
pub struct AudioTags {
    path: PathBuf,
    tag: Tag,
}

// `lofty::Tag` does not implement `Debug`.
impl std::fmt::Debug for AudioTags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioTags")
            .field("path", &self.path)
            .field("tag_type", &self.tag.tag_type())
            .finish_non_exhaustive()
    }
}

impl AudioTags {
    /// Read the primary tag of the file at `path`. A file without one
    /// starts with an empty tag of its primary type.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Read`] if the file cannot be opened or its format
    /// is not recognized.
    pub fn open(path: impl AsRef<Path>) -> TagResult<Self> {
        let path = path.as_ref();
        let tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|source| TagError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        // Every format lofty reads has a writable primary tag type.
        let tag_type = tagged_file.primary_tag_type();
        let tag = match tagged_file.tag(tag_type) {
            Some(tag) => tag.clone(),
            None => {
                log::debug!("{} has no {:?} tag; starting empty", path.display(), tag_type);
                Tag::new(tag_type)
            }
        };

        Ok(Self::from_tag(path, tag))
    }

    /// Wrap an already loaded tag. `save` writes it to `path`.
    pub fn from_tag(path: impl Into<PathBuf>, tag: Tag) -> Self {
        Self {
            path: path.into(),
            tag,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tag_type(&self) -> TagType {
        self.tag.tag_type()
    }

    fn describe_pictures(&self) -> Vec<Value> {
        self.tag
            .pictures()
            .iter()
            .map(|picture| Value::String(format!("<binary data, {} bytes>", picture.data().len())))
            .collect()
    }
}

impl TagContainer for AudioTags {
    fn known_fields(&self) -> Vec<&str> {
        AUDIO_FIELDS.to_vec()
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "art" => self.describe_pictures().into_iter().next(),
            "images" => {
                let pictures = self.describe_pictures();
                (!pictures.is_empty()).then_some(Value::Array(pictures))
            }
            _ => {
                let key = item_key(field)?;
                self.tag
                    .get_string(&key)
                    .map(|text| Value::String(text.to_string()))
            }
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        if is_image_field(field) {
            return Err(Error::InvalidValue {
                field: field.to_string(),
                message: "embedded images are read-only".to_string(),
            });
        }

        let key = item_key(field).ok_or_else(|| Error::UnknownField {
            field: field.to_string(),
        })?;

        if value.is_null() {
            self.tag.remove_key(&key);
            return Ok(());
        }

        let text = value_text(field, &value)?;
        if NUMERIC_FIELDS.contains(&field) && text.parse::<u32>().is_err() {
            return Err(Error::InvalidValue {
                field: field.to_string(),
                message: format!("'{text}' is not a number"),
            });
        }

        if !self.tag.insert_text(key, text) {
            return Err(Error::InvalidValue {
                field: field.to_string(),
                message: format!("not supported by {:?} tags", self.tag.tag_type()),
            });
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.tag
            .save_to_path(&self.path, WriteOptions::default())
            .map_err(|e| Error::Save(format!("{}: {}", self.path.display(), e)))?;
        log::info!("Wrote tags to {}", self.path.display());
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.tag
            .remove_from_path(&self.path)
            .map_err(|e| Error::Delete(format!("{}: {}", self.path.display(), e)))?;
        self.tag = Tag::new(self.tag.tag_type());
        log::info!("Removed tags from {}", self.path.display());
        Ok(())
    }
}

/// Render a canonical value as tag text.
fn value_text(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| value_text(field, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join(LIST_SEPARATOR))
        }
        Value::Null | Value::Object(_) => Err(Error::InvalidValue {
            field: field.to_string(),
            message: "expected text, a number or a list".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tagwright_core::tags::CANONICAL_FIELDS;
    use tagwright_core::TagTransaction;
    use tempfile::TempDir;

    fn vorbis_tags() -> AudioTags {
        AudioTags::from_tag("/nonexistent/song.flac", Tag::new(TagType::VorbisComments))
    }

    #[test]
    fn test_every_text_field_has_an_item_key() {
        for field in AUDIO_FIELDS {
            assert!(
                is_image_field(field) || item_key(field).is_some(),
                "no item key for {field}"
            );
        }
    }

    #[test]
    fn test_audio_fields_are_canonical() {
        for field in AUDIO_FIELDS {
            assert!(CANONICAL_FIELDS.contains(field), "{field} is not canonical");
        }
    }

    #[test]
    fn test_set_and_get_text() {
        let mut tags = vorbis_tags();
        tags.set("title", json!("Song")).unwrap();
        tags.set("mb_trackid", json!("abc-123")).unwrap();

        assert_eq!(tags.get("title"), Some(json!("Song")));
        assert_eq!(tags.get("mb_trackid"), Some(json!("abc-123")));
        assert_eq!(tags.get("album"), None);
    }

    #[test]
    fn test_numbers_are_written_as_text() {
        let mut tags = vorbis_tags();
        tags.set("track", json!(3)).unwrap();
        tags.set("disc", json!("1")).unwrap();

        assert_eq!(tags.get("track"), Some(json!("3")));
        assert_eq!(tags.get("disc"), Some(json!("1")));
    }

    #[test]
    fn test_non_numeric_track_is_refused() {
        let mut tags = vorbis_tags();
        let err = tags.set("track", json!("A1")).unwrap_err();

        assert!(matches!(err, Error::InvalidValue { ref field, .. } if field == "track"));
        assert_eq!(tags.get("track"), None);
    }

    #[test]
    fn test_list_values_are_joined() {
        let mut tags = vorbis_tags();
        tags.set("genre", json!(["Jazz", "Fusion"])).unwrap();
        assert_eq!(tags.get("genre"), Some(json!("Jazz; Fusion")));
    }

    #[test]
    fn test_object_value_is_refused() {
        let mut tags = vorbis_tags();
        assert!(tags.set("title", json!({"nested": true})).is_err());
    }

    #[test]
    fn test_null_clears_field() {
        let mut tags = vorbis_tags();
        tags.set("genre", json!("Jazz")).unwrap();
        tags.set("genre", Value::Null).unwrap();
        assert_eq!(tags.get("genre"), None);
    }

    #[test]
    fn test_unknown_field_is_refused() {
        let mut tags = vorbis_tags();
        assert!(!tags.recognizes("bogus"));
        assert!(matches!(
            tags.set("bogus", json!("x")),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_images_are_read_only() {
        let mut tags = vorbis_tags();
        assert_eq!(tags.get("art"), None);
        assert_eq!(tags.get("images"), None);
        assert!(matches!(
            tags.set("art", json!("<binary>")),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_as_dict_covers_audio_fields() {
        let mut tags = vorbis_tags();
        tags.set("title", json!("Song")).unwrap();

        let dict = tags.as_dict();

        assert_eq!(dict.len(), AUDIO_FIELDS.len());
        assert_eq!(dict["title"], json!("Song"));
        assert_eq!(dict["album"], Value::Null);
    }

    #[test]
    fn test_transaction_reports_save_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not-audio.flac");
        std::fs::write(&path, b"definitely not flac").unwrap();

        let mut tags = AudioTags::from_tag(&path, Tag::new(TagType::VorbisComments));
        let mut tx = TagTransaction::begin(&mut tags);
        tx.apply(json!({"title": "Song"}).as_object().unwrap());

        assert!(matches!(tx.commit(), Err(Error::Save(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = AudioTags::open(dir.path().join("missing.mp3")).unwrap_err();
        assert!(err.is_unreadable());
    }

    #[test]
    fn test_open_unrecognized_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "just some text").unwrap();

        let err = AudioTags::open(&path).unwrap_err();

        assert!(err.is_unreadable());
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_open_failures_are_read_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.flac");
        std::fs::write(&path, b"").unwrap();

        let err = AudioTags::open(&path).unwrap_err();

        assert!(matches!(err, TagError::Read { .. }));
    }
}
