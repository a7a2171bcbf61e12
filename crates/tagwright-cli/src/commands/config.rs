use anyhow::Result;
use std::path::PathBuf;
use tagwright_etl::{config, Config};

/// Show the current effective configuration.
pub fn show_config(store: Option<PathBuf>) -> Result<()> {
    let config = match store {
        Some(path) => Config::load_with_store_path(path)?,
        None => Config::load()?,
    };

    println!("Current Configuration");
    println!("=====================\n");

    let config_path = config::config_file_path();
    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  store_path: {}", config.store_path.display());
    println!("  cache_capacity: {}", config.cache_capacity);
    println!("  cache_ttl_secs: {}", config.cache_ttl_secs);
    println!("  persist_raw: {}", config.persist_raw);
    println!(
        "  mappings_dir: {}",
        config
            .mappings_dir
            .as_ref()
            .map_or_else(|| "<built-in tables>".to_string(), |dir| dir.display().to_string())
    );

    println!("\nPriority: CLI args > ENV vars (TAGWRIGHT_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure tagwright.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
