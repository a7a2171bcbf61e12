pub mod config;
pub mod lookup;
pub mod records;
pub mod tags;

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tagwright_core::Provider;

/// Parse a provider argument, listing the valid names on failure.
pub fn parse_provider(name: &str) -> Result<Provider> {
    Provider::parse(name).ok_or_else(|| {
        let valid: Vec<&str> = Provider::ALL.iter().map(|p| p.name()).collect();
        anyhow::anyhow!("Unknown provider: {}\n\nValid providers: {}", name, valid.join(", "))
    })
}

pub fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A value as a person would write it: strings unquoted, everything else
/// as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
