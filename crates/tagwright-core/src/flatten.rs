//! Path flattening for nested provider responses.
//!
//! A provider response is a tree of maps, sequences and scalars. Flattening
//! turns it into an ordered map from a path string to the scalar found at
//! that path. Map keys are joined with `.` and sequence indices are written
//! as `[i]`, so `release-list[0].artist-credit[0].name` addresses the name
//! of the first credited artist on the first release.
//!
//! Entries are ordered by a depth-first traversal: map keys in their native
//! order, sequence elements by ascending index. Input is assumed to be
//! acyclic API data; no depth limit is enforced.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// How far past the end of a sequence an index may point. Positions in
/// between are padded with `null`.
pub const MAX_INDEX_GAP: usize = 1024;

/// Ordered mapping of flat path to scalar value.
pub type FlatRecord = Map<String, Value>;

/// One step of a flat path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Flatten a nested tree into a [`FlatRecord`].
///
/// Empty maps and empty sequences contribute no entries. A scalar root is
/// recorded under the empty path. If two traversal paths produce the same
/// flat path, the later value replaces the earlier one.
pub fn flatten(tree: &Value) -> FlatRecord {
    let mut flat = FlatRecord::new();
    flatten_into(tree, String::new(), &mut flat);
    flat
}

fn flatten_into(value: &Value, path: String, flat: &mut FlatRecord) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(child, child_path, flat);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{path}[{index}]"), flat);
            }
        }
        scalar => {
            flat.insert(path, scalar.clone());
        }
    }
}

/// Re-nest a [`FlatRecord`] along its encoded paths.
///
/// This is the inverse of [`flatten`] for trees whose map keys contain no
/// `.` or `[` characters and which have no empty containers. Sequence gaps
/// of up to [`MAX_INDEX_GAP`] positions are padded with `null`.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for a path whose index lies more than
/// [`MAX_INDEX_GAP`] positions past the end of its sequence.
pub fn unflatten(flat: &FlatRecord) -> Result<Value> {
    let mut root = Value::Null;
    for (path, value) in flat {
        let segments = parse_path(path);
        insert_at(&mut root, &segments, value.clone()).map_err(|index| {
            Error::InvalidData(format!("index {index} in '{path}' is out of range"))
        })?;
    }
    Ok(root)
}

/// Returns the offending index when a sequence would grow too far.
fn insert_at(
    slot: &mut Value,
    segments: &[Segment],
    value: Value,
) -> std::result::Result<(), usize> {
    let Some((first, rest)) = segments.split_first() else {
        *slot = value;
        return Ok(());
    };

    match first {
        Segment::Key(key) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(map) = slot {
                let child = map.entry(key.clone()).or_insert(Value::Null);
                return insert_at(child, rest, value);
            }
            Ok(())
        }
        Segment::Index(index) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                if items.len() <= *index {
                    if *index - items.len() > MAX_INDEX_GAP {
                        return Err(*index);
                    }
                    items.resize(*index + 1, Value::Null);
                }
                return insert_at(&mut items[*index], rest, value);
            }
            Ok(())
        }
    }
}

/// Split a flat path into key and index segments.
///
/// A bracketed group that is not a valid index is kept as part of the key.
fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut key = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !key.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut key)));
                }
            }
            '[' => {
                let mut digits = String::new();
                let mut closed = false;
                for d in chars.by_ref() {
                    if d == ']' {
                        closed = true;
                        break;
                    }
                    digits.push(d);
                }
                match digits.parse::<usize>() {
                    Ok(index) if closed => {
                        if !key.is_empty() {
                            segments.push(Segment::Key(std::mem::take(&mut key)));
                        }
                        segments.push(Segment::Index(index));
                    }
                    _ => {
                        key.push('[');
                        key.push_str(&digits);
                        if closed {
                            key.push(']');
                        }
                    }
                }
            }
            other => key.push(other),
        }
    }

    if !key.is_empty() {
        segments.push(Segment::Key(key));
    }
    segments
}
