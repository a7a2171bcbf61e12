//! Diff-confirm-save transactions over a [`TagContainer`].
//!
//! A transaction snapshots the container, applies canonical updates field by
//! field, and reports what actually changed. Nothing reaches the underlying
//! file until [`TagTransaction::commit_if`] runs `save`, and it only does so
//! when a non-image field changed and the caller confirmed.
//!
//! ```
//! use serde_json::json;
//! use tagwright_core::{MemoryTags, TagTransaction};
//!
//! let mut tags = MemoryTags::new();
//! let updates = json!({"title": "Song", "artst": "Band"});
//!
//! let mut tx = TagTransaction::begin(&mut tags);
//! assert!(tx.apply(updates.as_object().unwrap()));
//! assert_eq!(tx.rejected()[0].suggestions[0], "artist");
//! assert!(tx.commit().unwrap());
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::mapping::CanonicalRecord;
use crate::tags::{is_image_field, suggest_fields, TagContainer};

/// One field whose value differs from the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Value,
    pub after: Value,
}

impl FieldChange {
    /// Whether this change concerns embedded image data.
    pub fn is_image(&self) -> bool {
        is_image_field(&self.field)
    }
}

/// An update that was not written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedField {
    pub field: String,
    pub reason: String,

    /// Close field names, best first. Empty when the field was known but
    /// its value was refused.
    pub suggestions: Vec<String>,
}

/// Pending edits to a tag container.
#[derive(Debug)]
pub struct TagTransaction<'a, T: TagContainer + ?Sized> {
    container: &'a mut T,
    snapshot: CanonicalRecord,
    rejected: Vec<RejectedField>,
}

impl<'a, T: TagContainer + ?Sized> TagTransaction<'a, T> {
    /// Snapshot `container` and start a transaction on it.
    pub fn begin(container: &'a mut T) -> Self {
        let snapshot = container.as_dict();
        Self {
            container,
            snapshot,
            rejected: Vec::new(),
        }
    }

    /// Apply every update, skipping the ones the container refuses, and
    /// report whether any non-image field now differs from the snapshot.
    pub fn apply(&mut self, updates: &CanonicalRecord) -> bool {
        for (field, value) in updates {
            self.set(field, value.clone());
        }
        self.changed()
    }

    /// Apply one update. Returns `false` when it was rejected.
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        if !self.container.recognizes(field) {
            let suggestions = suggest_fields(field, &self.container.known_fields());
            if suggestions.is_empty() {
                log::warn!("Invalid metadata field: {}", field);
            } else {
                log::warn!(
                    "Invalid metadata field: {} (did you mean {}?)",
                    field,
                    suggestions.join(", ")
                );
            }
            self.rejected.push(RejectedField {
                field: field.to_string(),
                reason: Error::UnknownField {
                    field: field.to_string(),
                }
                .to_string(),
                suggestions,
            });
            return false;
        }

        match self.container.set(field, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not update {}: {}", field, e);
                self.rejected.push(RejectedField {
                    field: field.to_string(),
                    reason: e.to_string(),
                    suggestions: Vec::new(),
                });
                false
            }
        }
    }

    /// The container state when the transaction began.
    pub fn snapshot(&self) -> &CanonicalRecord {
        &self.snapshot
    }

    /// Updates that were not written, in the order they were attempted.
    pub fn rejected(&self) -> &[RejectedField] {
        &self.rejected
    }

    /// Every field that differs from the snapshot, image fields included.
    pub fn changes(&self) -> Vec<FieldChange> {
        let current = self.container.as_dict();
        let mut changes = Vec::new();

        for (field, after) in &current {
            let before = self.snapshot.get(field).unwrap_or(&Value::Null);
            if before != after {
                changes.push(FieldChange {
                    field: field.clone(),
                    before: before.clone(),
                    after: after.clone(),
                });
            }
        }

        for (field, before) in &self.snapshot {
            if !current.contains_key(field) && !before.is_null() {
                changes.push(FieldChange {
                    field: field.clone(),
                    before: before.clone(),
                    after: Value::Null,
                });
            }
        }

        changes
    }

    /// Whether any non-image field differs from the snapshot.
    pub fn changed(&self) -> bool {
        self.changes().iter().any(|change| !change.is_image())
    }

    /// Save if anything changed.
    ///
    /// # Errors
    ///
    /// Returns the container's save error.
    pub fn commit(self) -> Result<bool> {
        self.commit_if(|_| true)
    }

    /// Save if anything changed and `confirm` approves the change list.
    /// Returns whether `save` ran.
    ///
    /// # Errors
    ///
    /// Returns the container's save error.
    pub fn commit_if<F>(mut self, confirm: F) -> Result<bool>
    where
        F: FnOnce(&[FieldChange]) -> bool,
    {
        let changes = self.changes();
        if !changes.iter().any(|change| !change.is_image()) {
            log::info!("No changes to save");
            return Ok(false);
        }

        if !confirm(&changes) {
            log::info!("Changes not saved");
            return Ok(false);
        }

        self.container.save()?;
        log::info!("Saved {} changed fields", changes.len());
        Ok(true)
    }

    /// Put every changed field back to its snapshot value without saving.
    ///
    /// # Errors
    ///
    /// Returns the first error the container reports while restoring.
    pub fn rollback(mut self) -> Result<()> {
        for change in self.changes() {
            self.container.set(&change.field, change.before)?;
        }
        Ok(())
    }
}

/// Parse `field=value` strings into canonical updates. Values are kept as
/// strings; the container coerces them.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for an item without `=` or with an empty
/// field name.
pub fn parse_assignments<S: AsRef<str>>(items: &[S]) -> Result<CanonicalRecord> {
    let mut updates = CanonicalRecord::new();

    for item in items {
        let item = item.as_ref();
        let Some((field, value)) = item.split_once('=') else {
            return Err(Error::InvalidData(format!(
                "expected field=value, got '{item}'"
            )));
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(Error::InvalidData(format!("missing field name in '{item}'")));
        }

        updates.insert(field.to_string(), Value::String(value.to_string()));
    }

    Ok(updates)
}
