//! Provider lookups, configuration and audio-file tags for tagwright.
//!
//! Wires the core engine to the outside world: configuration loading,
//! cached and persisted provider lookups, replayed provider responses, and a
//! lofty-backed tag container for real audio files.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod audio;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod recorded;

pub use audio::AudioTags;
pub use config::Config;
pub use error::{TagError, TagResult};
pub use reconcile::{CacheKey, ReconciliationQuery};
pub use recorded::RecordedProvider;
