//! One-shot provider lookups with caching and persistence.
//!
//! A [`ReconciliationQuery`] answers "what does this provider say about this
//! track?". A cached answer is returned as is. Otherwise the provider is
//! asked, every candidate is flattened and translated into canonical
//! fields, the translated records are appended to the store, and the list
//! is cached.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tagwright_core::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use tagwright_core::{
    flatten, translate, CanonicalRecord, Clock, MappingRegistry, MetadataCache, MetadataStore,
    Provider, ProviderClient, SearchOutcome, TrackQuery,
};

use crate::config::Config;

/// Cache identity of a lookup: the provider plus the exact query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: Provider,
    pub query: TrackQuery,
}

/// Store source name for untranslated candidates of `provider`.
pub fn raw_source_name(provider: Provider) -> String {
    format!("{}-raw", provider.name())
}

/// Cached, persisted provider lookups.
#[derive(Debug)]
pub struct ReconciliationQuery {
    store: Arc<MetadataStore>,
    cache: MetadataCache<CacheKey, Vec<CanonicalRecord>>,
    mappings: MappingRegistry,
    persist_raw: bool,
}

impl ReconciliationQuery {
    /// A query with the default cache and the built-in field tables.
    pub fn new(store: Arc<MetadataStore>) -> Self {
        Self {
            store,
            cache: MetadataCache::new(DEFAULT_CAPACITY, DEFAULT_TTL),
            mappings: MappingRegistry::builtin(),
            persist_raw: false,
        }
    }

    /// Build a query from configuration: store path, cache bounds, mapping
    /// overrides and raw persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if a mapping override file cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mappings = match &config.mappings_dir {
            Some(dir) => MappingRegistry::load_dir(dir)
                .with_context(|| format!("Failed to load mappings from {}", dir.display()))?,
            None => MappingRegistry::builtin(),
        };

        Ok(Self::new(Arc::new(MetadataStore::new(&config.store_path)))
            .with_cache(MetadataCache::new(config.cache_capacity, config.cache_ttl()))
            .with_mappings(mappings)
            .with_persist_raw(config.persist_raw))
    }

    #[must_use]
    pub fn with_cache(mut self, cache: MetadataCache<CacheKey, Vec<CanonicalRecord>>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the cache with one of the same bounds driven by `clock`.
    #[must_use]
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        let cache = MetadataCache::with_clock(self.cache.capacity(), self.cache.ttl(), clock);
        self.with_cache(cache)
    }

    #[must_use]
    pub fn with_mappings(mut self, mappings: MappingRegistry) -> Self {
        self.mappings = mappings;
        self
    }

    #[must_use]
    pub fn with_persist_raw(mut self, persist_raw: bool) -> Self {
        self.persist_raw = persist_raw;
        self
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    pub fn mappings(&self) -> &MappingRegistry {
        &self.mappings
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Number of live cached lookups.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Look up a track by title and artist.
    pub fn fetch<C>(&mut self, client: &C, title: &str, artist: &str) -> Option<Vec<CanonicalRecord>>
    where
        C: ProviderClient + ?Sized,
    {
        self.fetch_query(client, &TrackQuery::new(title, artist))
    }

    /// Look up a track. Returns the translated candidates in provider
    /// order, or `None` when the provider failed or found nothing. Failures
    /// are neither cached nor persisted.
    pub fn fetch_query<C>(&mut self, client: &C, query: &TrackQuery) -> Option<Vec<CanonicalRecord>>
    where
        C: ProviderClient + ?Sized,
    {
        let provider = client.provider();
        let key = CacheKey {
            provider,
            query: query.clone(),
        };

        if let Some(records) = self.cache.get(&key) {
            log::info!(
                "Cache hit for {} - {} ({})",
                query.artist,
                query.title,
                provider
            );
            return Some(records);
        }

        let candidates = match client.search_track(query) {
            SearchOutcome::Found(candidates) if !candidates.is_empty() => candidates,
            SearchOutcome::Found(_) | SearchOutcome::NotFound => {
                log::warn!(
                    "No {} results for {} - {}",
                    provider,
                    query.artist,
                    query.title
                );
                return None;
            }
            SearchOutcome::Failed(reason) => {
                log::warn!(
                    "{} lookup failed for {} - {}: {}",
                    provider,
                    query.artist,
                    query.title,
                    reason
                );
                return None;
            }
        };

        let records = self.translate_candidates(provider, &candidates);
        self.persist(provider, &candidates, &records);

        log::info!(
            "Fetched {} {} candidate(s) for {} - {}",
            records.len(),
            provider,
            query.artist,
            query.title
        );
        self.cache.put(key, records.clone());
        Some(records)
    }

    /// Flatten and translate raw candidates with the active table.
    pub fn translate_candidates(&self, provider: Provider, candidates: &[Value]) -> Vec<CanonicalRecord> {
        let mapping = self.mappings.mapping_for(provider);
        candidates
            .iter()
            .map(|candidate| translate(&flatten(candidate), mapping))
            .collect()
    }

    /// Every translated record ever stored for `provider`.
    pub fn history(&self, provider: Provider) -> Vec<Value> {
        self.store.get_metadata(provider.name())
    }

    fn persist(&self, provider: Provider, candidates: &[Value], records: &[CanonicalRecord]) {
        if self.persist_raw {
            let source = raw_source_name(provider);
            for candidate in candidates {
                if let Err(e) = self.store.add_metadata(&source, candidate.clone()) {
                    log::error!("Failed to store raw {} record: {}", provider, e);
                }
            }
        }

        for record in records {
            if let Err(e) = self
                .store
                .add_metadata(provider.name(), Value::Object(record.clone()))
            {
                log::error!("Failed to store {} record: {}", provider, e);
            }
        }
    }
}
