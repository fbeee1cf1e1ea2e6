//! Per-generation metadata access.
//!
//! `Lookup` is the only path strategies use to reach the provider. It applies
//! the caller-side retry policy, memoizes every answer (misses included) and
//! owns the generation's RNG.

use crate::config::GeneratorConfig;
use crate::item::ItemRecord;
use crate::provider::MetadataProvider;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct Lookup<'a, P: ?Sized> {
    provider: &'a P,
    config: &'a GeneratorConfig,
    records: HashMap<String, Option<ItemRecord>>,
    rng: StdRng,
    failures: usize,
}

impl<'a, P: MetadataProvider + ?Sized> Lookup<'a, P> {
    pub fn new(provider: &'a P, config: &'a GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            provider,
            config,
            records: HashMap::new(),
            rng,
            failures: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.config
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Metadata for `id`, or `None` when the item is unusable.
    ///
    /// Transient failures are retried up to `fetch_retries` times; NotFound is
    /// final. Either way the outcome is cached for the rest of the generation.
    pub async fn record(&mut self, id: &str) -> Option<ItemRecord> {
        if let Some(cached) = self.records.get(id) {
            return cached.clone();
        }

        let mut attempts = 0;
        let outcome = loop {
            match self.provider.get_item(id).await {
                Ok(record) => break Some(record),
                Err(err) if err.is_transient() && attempts < self.config.fetch_retries => {
                    attempts += 1;
                    debug!(%id, error = %err, attempts, "retrying lookup");
                }
                Err(err) => {
                    warn!(%id, error = %err, "treating item as attribute-less");
                    self.failures += 1;
                    break None;
                }
            }
        };

        self.records.insert(id.to_string(), outcome.clone());
        outcome
    }

    /// Already-fetched metadata, without touching the provider
    pub fn cached(&self, id: &str) -> Option<&ItemRecord> {
        self.records.get(id).and_then(Option::as_ref)
    }

    /// Whether `id` has been looked up (successfully or not)
    pub fn is_known(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of lookups that ended without a record
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Hand the cache over to the caller
    pub fn into_records(self) -> HashMap<String, Option<ItemRecord>> {
        self.records
    }
}
