//! Core reconciliation engine for tagwright.
//!
//! This crate flattens nested provider responses into addressable paths,
//! translates them into the canonical tag vocabulary, caches and persists
//! the results, and applies them to tag containers through a
//! diff-then-save transaction.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod error;
pub mod flatten;
pub mod mapping;
pub mod provider;
pub mod store;
pub mod tags;
pub mod transaction;

pub use cache::{Clock, ManualClock, MetadataCache, SystemClock};
pub use error::{Error, Result};
pub use flatten::{flatten, unflatten, FlatRecord};
pub use mapping::{translate, CanonicalRecord, FieldMapping, MappingRegistry};
pub use provider::{Provider, ProviderClient, SearchOutcome, TrackQuery};
pub use store::MetadataStore;
pub use tags::{suggest_fields, MemoryTags, TagContainer};
pub use transaction::{parse_assignments, FieldChange, RejectedField, TagTransaction};
