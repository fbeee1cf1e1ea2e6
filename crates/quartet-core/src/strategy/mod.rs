//! Group-building strategies.
//!
//! Every strategy receives a read view of the remaining pool and either
//! returns one group of exactly the target size or `None`. Strategies never
//! mutate the pool; the assembler removes claimed members.

mod category;
mod lineage;
mod random;
mod rarity;

use crate::lookup::Lookup;
use crate::provider::MetadataProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use lineage::fill_from_category;

/// The rule that justified a group's formation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", content = "key", rename_all = "snake_case")]
pub enum GroupRule {
    /// Shared primary category tag
    Category(String),
    /// Shared lineage identifier (possibly padded by the filler)
    Lineage(String),
    /// Rarity flag (possibly padded)
    Rarity,
    /// Uniform random completion
    Random,
}

impl fmt::Display for GroupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRule::Category(tag) => write!(f, "category {}", tag),
            GroupRule::Lineage(id) => write!(f, "lineage {}", id),
            GroupRule::Rarity => write!(f, "rarity"),
            GroupRule::Random => write!(f, "random"),
        }
    }
}

/// A set of distinct identifiers plus the rule that formed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub members: Vec<String>,
    pub rule: GroupRule,
}

impl Group {
    pub fn new(members: Vec<String>, rule: GroupRule) -> Self {
        Self { members, rule }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Interchangeable ways of carving one group out of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Category,
    Lineage,
    Rarity,
    Random,
}

impl Strategy {
    /// Try to build one group of `size` members from `pool`
    pub async fn attempt<P: MetadataProvider + ?Sized>(
        self,
        pool: &[String],
        size: usize,
        lookup: &mut Lookup<'_, P>,
    ) -> Option<Group> {
        if size == 0 || pool.len() < size {
            return None;
        }
        match self {
            Strategy::Category => category::build(pool, size, lookup).await,
            Strategy::Lineage => lineage::build(pool, size, lookup).await,
            Strategy::Rarity => rarity::build(pool, size, lookup).await,
            Strategy::Random => random::build(pool, size, lookup),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Category => "category-match",
            Strategy::Lineage => "lineage-match",
            Strategy::Rarity => "rarity-match",
            Strategy::Random => "random",
        };
        f.write_str(name)
    }
}

// ==================== Shared helpers ====================

/// Outcome of a greedy streaming bucket scan
pub(crate) struct BucketScan {
    /// First bucket to reach the target size, in sample order
    pub full: Option<(String, Vec<String>)>,
    /// Every bucket seen, in order of first appearance
    pub buckets: Vec<(String, Vec<String>)>,
}

impl BucketScan {
    /// Largest bucket with at least `min` members; earliest wins ties
    pub fn best_partial(&self, min: usize) -> Option<&(String, Vec<String>)> {
        self.buckets
            .iter()
            .filter(|(_, members)| members.len() >= min)
            .fold(None, |best: Option<&(String, Vec<String>)>, candidate| match best {
                Some(b) if b.1.len() >= candidate.1.len() => Some(b),
                _ => Some(candidate),
            })
    }
}

/// Stream shuffled pool members through `key_of`, stopping at the first full bucket.
///
/// Fetches metadata lazily and looks at no more than the configured sample
/// budget, so a run is bounded by one pass over the pool.
pub(crate) async fn scan_buckets<P, F>(
    pool: &[String],
    size: usize,
    lookup: &mut Lookup<'_, P>,
    key_of: F,
) -> BucketScan
where
    P: MetadataProvider + ?Sized,
    F: Fn(&crate::item::ItemRecord) -> Option<String>,
{
    let order = shuffled(pool, lookup);
    let budget = lookup.config().samples_for(pool.len());

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<String>)> = Vec::new();

    for id in order.into_iter().take(budget) {
        let Some(record) = lookup.record(&id).await else {
            continue;
        };
        let Some(key) = key_of(&record) else {
            continue;
        };

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push((key.clone(), Vec::new()));
            buckets.len() - 1
        });
        let bucket = &mut buckets[slot].1;
        bucket.push(id);
        if bucket.len() == size {
            let full = (key, bucket.clone());
            return BucketScan {
                full: Some(full),
                buckets,
            };
        }
    }

    BucketScan {
        full: None,
        buckets,
    }
}

/// Pool copy in uniformly random order
pub(crate) fn shuffled<P: ?Sized>(pool: &[String], lookup: &mut Lookup<'_, P>) -> Vec<String>
where
    P: MetadataProvider,
{
    use rand::seq::SliceRandom;
    let mut order = pool.to_vec();
    order.shuffle(lookup.rng());
    order
}

/// Complete `members` to `size` with pool items taken from the tail
pub(crate) fn pad_from_tail(members: &mut Vec<String>, pool: &[String], size: usize) {
    for id in pool.iter().rev() {
        if members.len() >= size {
            break;
        }
        if !members.contains(id) {
            members.push(id.clone());
        }
    }
}
