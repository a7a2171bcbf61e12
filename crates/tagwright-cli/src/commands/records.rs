use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use tagwright_core::{flatten, unflatten, MetadataStore, Provider};
use tagwright_etl::recorded::extract_candidates;
use tagwright_etl::{Config, ReconciliationQuery};

use super::{parse_provider, print_json, read_json};

/// Print a JSON file as flat path/value pairs.
pub fn flatten_file(path: &Path) -> Result<()> {
    let value = read_json(path)?;
    print_json(&Value::Object(flatten(&value)))
}

/// Print flat path/value pairs from a JSON file as a nested document.
pub fn unflatten_file(path: &Path) -> Result<()> {
    let tree = rebuild(read_json(path)?)?;
    print_json(&tree)
}

fn rebuild(value: Value) -> Result<Value> {
    let Value::Object(flat) = value else {
        anyhow::bail!("Expected an object of flat paths");
    };
    Ok(unflatten(&flat)?)
}

/// Translate every candidate in a saved response and print the records.
pub fn translate_file(config: &Config, provider: &str, path: &Path) -> Result<()> {
    let provider = parse_provider(provider)?;
    let candidates = candidates_from(read_json(path)?, provider)?;

    let query = ReconciliationQuery::from_config(config)?;
    let records = query.translate_candidates(provider, &candidates);

    print_json(&Value::Array(records.into_iter().map(Value::Object).collect()))
}

/// Show stored records for one source, or a per-source summary.
pub fn show_store(config: &Config, source: Option<&str>) -> Result<()> {
    let store = MetadataStore::new(&config.store_path);

    if let Some(source) = source {
        return print_json(&Value::Array(store.get_metadata(source)));
    }

    let all = store.get_all_metadata();

    println!("Store: {}", store.path().display());
    if all.is_empty() {
        println!("  (empty)");
        println!("\n  Run `tagwright lookup` to fetch and store results");
        return Ok(());
    }

    for (source, records) in &all {
        println!("  {}: {} record(s)", source, records.len());
    }

    Ok(())
}

/// Candidates from a response object, a bare array, or a single record.
fn candidates_from(value: Value, provider: Provider) -> Result<Vec<Value>> {
    if let Some(candidates) = extract_candidates(value.clone(), provider.result_list_key()) {
        return Ok(candidates);
    }

    match value {
        Value::Object(_) => Ok(vec![value]),
        _ => anyhow::bail!("Expected a {} response, a list or a record", provider),
    }
}
