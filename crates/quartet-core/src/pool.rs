//! Candidate pool construction and per-scope memoization.

use crate::config::Scope;
use crate::error::GenerateError;
use crate::provider::MetadataProvider;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{info, warn};

/// Deduplicated identifiers eligible for one session, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    ids: Vec<String>,
}

impl CandidatePool {
    /// Deduplicate identifiers, keeping the first occurrence
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| seen.insert(id.clone()))
            .collect();
        Self { ids }
    }

    /// Query every scope unit and union the results.
    ///
    /// Failing units are logged and skipped. Fails only when the union holds
    /// fewer than `required` identifiers.
    pub async fn build<P: MetadataProvider + ?Sized>(
        provider: &P,
        scope: &Scope,
        required: usize,
    ) -> Result<Self, GenerateError> {
        let mut listed = Vec::new();
        for unit in scope.units() {
            match provider.list_scope(unit).await {
                Ok(ids) => listed.extend(ids),
                Err(err) => warn!(unit = %unit, error = %err, "skipping scope unit"),
            }
        }

        let pool = Self::from_ids(listed);
        info!(size = pool.len(), units = scope.units().len(), "candidate pool built");
        pool.ensure(required)?;
        Ok(pool)
    }

    /// Fail with `InsufficientPool` unless the pool holds `required` identifiers
    pub fn ensure(&self, required: usize) -> Result<(), GenerateError> {
        if self.ids.len() < required {
            return Err(GenerateError::InsufficientPool {
                found: self.ids.len(),
                required,
            });
        }
        Ok(())
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }
}

/// Memoized pools keyed by scope.
///
/// Owned by the session context and handed to generation explicitly; only the
/// pool-build step writes to it.
#[derive(Debug, Default)]
pub struct PoolCache {
    pools: RefCell<HashMap<Scope, Rc<CandidatePool>>>,
}

impl PoolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached pool for `scope`, building it on a miss or when `fresh` is set
    pub async fn get_or_build<P: MetadataProvider + ?Sized>(
        &self,
        provider: &P,
        scope: &Scope,
        required: usize,
        fresh: bool,
    ) -> Result<Rc<CandidatePool>, GenerateError> {
        if !fresh {
            let cached = self.pools.borrow().get(scope).cloned();
            if let Some(pool) = cached {
                pool.ensure(required)?;
                return Ok(pool);
            }
        }

        let pool = Rc::new(CandidatePool::build(provider, scope, required).await?);
        self.pools.borrow_mut().insert(scope.clone(), Rc::clone(&pool));
        Ok(pool)
    }

    pub fn contains(&self, scope: &Scope) -> bool {
        self.pools.borrow().contains_key(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{record, MemoryCatalog};
    use futures::executor::block_on;

    #[test]
    fn test_from_ids_dedups_in_order() {
        let pool = CandidatePool::from_ids(["b", "a", "b", "c", "a"]);
        assert_eq!(pool.ids(), ["b", "a", "c"]);
    }

    #[test]
    fn test_build_unions_units() {
        let catalog = MemoryCatalog::sample().with_item("2", record("pikachu", &["electric"], None, false));
        let pool = block_on(CandidatePool::build(&catalog, &Scope::eras(1, 2), 16)).unwrap();
        assert_eq!(pool.len(), 26);
        assert_eq!(catalog.scope_calls(), 2);
    }

    #[test]
    fn test_build_skips_failing_units() {
        let catalog = MemoryCatalog::sample().with_failing_unit("2");
        let pool = block_on(CandidatePool::build(&catalog, &Scope::eras(1, 3), 16)).unwrap();
        // unit 3 is unknown, unit 2 fails; unit 1 alone has 19 items
        assert_eq!(pool.len(), 19);
    }

    #[test]
    fn test_build_insufficient_pool() {
        let catalog = MemoryCatalog::sample();
        let err = block_on(CandidatePool::build(&catalog, &Scope::eras(2, 2), 16)).unwrap_err();
        assert_eq!(err, GenerateError::InsufficientPool { found: 6, required: 16 });
    }

    #[test]
    fn test_cache_reuses_pool_until_fresh() {
        let catalog = MemoryCatalog::sample();
        let cache = PoolCache::new();
        let scope = Scope::eras(1, 2);

        let first = block_on(cache.get_or_build(&catalog, &scope, 16, false)).unwrap();
        let second = block_on(cache.get_or_build(&catalog, &scope, 16, false)).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(catalog.scope_calls(), 2);

        let third = block_on(cache.get_or_build(&catalog, &scope, 16, true)).unwrap();
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(catalog.scope_calls(), 4);
        assert!(cache.contains(&scope));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let catalog = MemoryCatalog::sample();
        let cache = PoolCache::new();
        let scope = Scope::eras(2, 2);
        assert!(block_on(cache.get_or_build(&catalog, &scope, 16, false)).is_err());
        assert!(!cache.contains(&scope));
    }
}
