use anyhow::{Context, Result};
use std::path::Path;
use tagwright_core::{parse_assignments, CanonicalRecord, FieldChange, TagContainer, TagTransaction};
use tagwright_etl::AudioTags;

use super::display_value;

fn open(path: &Path) -> Result<AudioTags> {
    AudioTags::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Print every field that has a value.
pub fn show_tags(path: &Path) -> Result<()> {
    let tags = open(path)?;

    println!("{} ({:?})", path.display(), tags.tag_type());
    let mut empty = true;
    for (field, value) in tags.as_dict() {
        if !value.is_null() {
            println!("  {}: {}", field, display_value(&value));
            empty = false;
        }
    }
    if empty {
        println!("  (no tags)");
    }

    Ok(())
}

pub fn set_tags(path: &Path, assignments: &[String], yes: bool) -> Result<()> {
    let updates = parse_assignments(assignments)?;
    apply_updates(path, &updates, yes)
}

/// Apply canonical updates to a file, list the changes, and save only when
/// `yes` is set.
pub fn apply_updates(path: &Path, updates: &CanonicalRecord, yes: bool) -> Result<()> {
    let mut tags = open(path)?;
    let mut tx = TagTransaction::begin(&mut tags);
    tx.apply(updates);

    for rejected in tx.rejected() {
        if rejected.suggestions.is_empty() {
            println!("  skipped {}: {}", rejected.field, rejected.reason);
        } else {
            println!(
                "  skipped {}: {} (did you mean {}?)",
                rejected.field,
                rejected.reason,
                rejected.suggestions.join(", ")
            );
        }
    }

    if !tx.changed() {
        println!("No changes to {}", path.display());
        return Ok(());
    }

    let saved = tx.commit_if(|changes| {
        println!("Changes to {}:", path.display());
        for change in changes {
            println!("  {}", describe_change(change));
        }
        if !yes {
            println!("\nRe-run with --yes to save.");
        }
        yes
    })?;

    if saved {
        println!("✓ Saved {}", path.display());
    }

    Ok(())
}

/// Remove the file's tag, only when `yes` is set.
pub fn clear_tags(path: &Path, yes: bool) -> Result<()> {
    let mut tags = open(path)?;

    if !yes {
        println!("This removes every tag from {}.", path.display());
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }

    tags.delete()?;
    println!("✓ Cleared tags from {}", path.display());
    Ok(())
}

fn describe_change(change: &FieldChange) -> String {
    if change.is_image() {
        return format!("{}: changed (binary)", change.field);
    }
    match (change.before.is_null(), change.after.is_null()) {
        (true, _) => format!("{}: (unset) -> {}", change.field, display_value(&change.after)),
        (_, true) => format!("{}: {} -> (unset)", change.field, display_value(&change.before)),
        _ => format!(
            "{}: {} -> {}",
            change.field,
            display_value(&change.before),
            display_value(&change.after)
        ),
    }
}
