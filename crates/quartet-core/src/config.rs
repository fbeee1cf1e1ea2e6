use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// A configured range of catalog segments eligible for a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    units: Vec<String>,
}

impl Scope {
    /// Create a scope from explicit unit identifiers (duplicates are dropped)
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let units = units
            .into_iter()
            .map(Into::into)
            .filter(|unit: &String| seen.insert(unit.clone()))
            .collect();
        Self { units }
    }

    /// Numbered eras `first..=last`
    pub fn eras(first: u8, last: u8) -> Self {
        let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
        Self::new((lo..=hi).map(|n| n.to_string()))
    }

    /// Parse "3", "1-3" or "1,4,5" into a scope
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some((first, last)) = text.split_once('-') {
            let first = first.trim().parse().ok()?;
            let last = last.trim().parse().ok()?;
            return Some(Self::eras(first, last));
        }
        let units: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .map(str::to_string)
            .collect();
        if units.is_empty() {
            None
        } else {
            Some(Self::new(units))
        }
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::eras(1, 3)
    }
}

/// Which items count as "rare" for rarity-match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum RarityRule {
    /// Use the catalog's rarity attribute
    #[default]
    Attribute,
    /// Only identifiers on a curated list
    Curated(BTreeSet<String>),
    /// Either the attribute or the curated list
    AttributeOrCurated(BTreeSet<String>),
}

impl RarityRule {
    /// Whether an identifier is rare without consulting metadata
    pub fn listed(&self, id: &str) -> bool {
        match self {
            RarityRule::Attribute => false,
            RarityRule::Curated(ids) | RarityRule::AttributeOrCurated(ids) => ids.contains(id),
        }
    }

    /// Whether the rule ever needs the rarity attribute
    pub fn uses_attribute(&self) -> bool {
        !matches!(self, RarityRule::Curated(_))
    }
}

/// Configuration for board generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Catalog segments to draw candidates from
    pub scope: Scope,
    /// Items per group
    pub group_size: usize,
    /// Groups per board
    pub group_count: usize,
    /// Rarity predicate for rarity-match
    pub rarity: RarityRule,
    /// Extra attempts after a transient lookup failure
    pub fetch_retries: u32,
    /// Maximum metadata lookups per strategy run (defaults to one pass over the pool)
    pub sample_cap: Option<usize>,
    /// Seed for reproducible boards
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scope: Scope::default(),
            group_size: 4,
            group_count: 4,
            rarity: RarityRule::Attribute,
            fetch_retries: 1,
            sample_cap: None,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Default configuration over eras `first..=last`
    pub fn eras(first: u8, last: u8) -> Self {
        Self {
            scope: Scope::eras(first, last),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject shapes that cannot produce a board
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.group_size == 0 || self.group_count == 0 {
            return Err(GenerateError::InvalidShape {
                group_size: self.group_size,
                group_count: self.group_count,
            });
        }
        Ok(())
    }

    /// Number of distinct identifiers on a finished board
    pub fn board_size(&self) -> usize {
        self.group_size * self.group_count
    }

    /// Lookup budget for one strategy run over a pool of `pool_len` items
    pub fn samples_for(&self, pool_len: usize) -> usize {
        self.sample_cap.map_or(pool_len, |cap| cap.min(pool_len))
    }
}

/// Spacing policy for provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum time between the starts of two consecutive calls
    #[serde(with = "millis")]
    pub min_spacing: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_spacing: Duration::from_millis(120),
        }
    }
}

/// Remote catalog location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Per-request timeout (ignored in the browser)
    #[serde(with = "millis")]
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
