use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tagwright_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "tagwright", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the metadata store (default: ~/.local/share/tagwright/store.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Print a JSON document as flat path/value pairs
    ///
    /// Nested objects are joined with "." and list positions are written as
    /// "[i]", so {"a": {"b": [1]}} becomes {"a.b[0]": 1}.
    Flatten {
        /// JSON file to flatten
        file: PathBuf,
    },

    /// Rebuild a nested JSON document from flat path/value pairs
    Unflatten {
        /// JSON object of flat paths, as printed by `flatten`
        file: PathBuf,
    },

    /// Translate a saved provider response into canonical tag fields
    ///
    /// Accepts a full search response (e.g. a MusicBrainz "recording-list"
    /// object), a bare array of candidates, or a single candidate object.
    Translate {
        /// Provider the response came from (musicbrainz, deezer, spotify)
        #[arg(long, short)]
        provider: String,

        /// JSON response file
        file: PathBuf,
    },

    /// Look up a track from a saved provider response
    ///
    /// Runs the full lookup: the response is flattened, translated, appended
    /// to the store and printed. With --apply, the first candidate is written
    /// onto an audio file's tags (only with --yes; otherwise the changes are
    /// listed and nothing is saved).
    Lookup {
        /// Provider the response came from (musicbrainz, deezer, spotify)
        #[arg(long, short)]
        provider: String,

        /// JSON response file to replay
        #[arg(long)]
        response: PathBuf,

        #[arg(long)]
        title: String,

        #[arg(long)]
        artist: String,

        #[arg(long)]
        album: Option<String>,

        /// Audio file to write the best candidate onto
        #[arg(long)]
        apply: Option<PathBuf>,

        /// Save the changes without asking
        #[arg(long, short)]
        yes: bool,
    },

    /// Show stored lookup results
    Store {
        /// Only show records from this source (e.g. "deezer", "deezer-raw")
        #[arg(long)]
        source: Option<String>,
    },

    /// Inspect or edit an audio file's tags
    Tags {
        #[command(subcommand)]
        command: TagsCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum TagsCommand {
    /// Print every known field of a file
    Show { file: PathBuf },

    /// Set fields from field=value pairs
    Set {
        file: PathBuf,

        /// Assignments such as title="Song" or track=3
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Save the changes without asking
        #[arg(long, short)]
        yes: bool,
    },

    /// Remove the file's tag entirely
    Clear {
        file: PathBuf,

        /// Required to actually remove the tag
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create the config file with defaults
    Init,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
}

fn load_config(store: Option<PathBuf>) -> Result<Config> {
    match store {
        Some(path) => Config::load_with_store_path(path),
        None => Config::load(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Flatten { file } => {
            commands::records::flatten_file(&file)?;
        }
        Commands::Unflatten { file } => {
            commands::records::unflatten_file(&file)?;
        }
        Commands::Translate { provider, file } => {
            let config = load_config(cli.store)?;
            commands::records::translate_file(&config, &provider, &file)?;
        }
        Commands::Lookup {
            provider,
            response,
            title,
            artist,
            album,
            apply,
            yes,
        } => {
            let config = load_config(cli.store)?;
            let request = commands::lookup::LookupRequest {
                provider,
                response,
                title,
                artist,
                album,
            };
            commands::lookup::run_lookup(&config, &request, apply.as_deref(), yes)?;
        }
        Commands::Store { source } => {
            let config = load_config(cli.store)?;
            commands::records::show_store(&config, source.as_deref())?;
        }
        Commands::Tags { command } => match command {
            TagsCommand::Show { file } => commands::tags::show_tags(&file)?,
            TagsCommand::Set {
                file,
                assignments,
                yes,
            } => commands::tags::set_tags(&file, &assignments, yes)?,
            TagsCommand::Clear { file, yes } => commands::tags::clear_tags(&file, yes)?,
        },
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show_config(cli.store)?,
            ConfigCommand::Init => commands::config::init_config()?,
            ConfigCommand::Path => commands::config::show_path(),
            ConfigCommand::Example => commands::config::show_example(),
        },
    }

    Ok(())
}
