//! In-memory catalog fixture for tests.

use crate::error::ProviderError;
use crate::item::ItemRecord;
use crate::provider::MetadataProvider;
use async_trait::async_trait;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Catalog backed by maps, with injectable failures
#[derive(Default)]
pub struct MemoryCatalog {
    records: HashMap<String, ItemRecord>,
    scopes: BTreeMap<String, Vec<String>>,
    transient_items: HashSet<String>,
    failing_units: HashSet<String>,
    /// Items that fail transiently only on their first lookup
    flaky_items: HashSet<String>,
    flaky_seen: std::cell::RefCell<HashSet<String>>,
    item_calls: Cell<usize>,
    scope_calls: Cell<usize>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to a scope unit
    pub fn with_item(mut self, unit: &str, record: ItemRecord) -> Self {
        self.scopes
            .entry(unit.to_string())
            .or_default()
            .push(record.id.clone());
        self.records.insert(record.id.clone(), record);
        self
    }

    /// List an identifier in a scope unit without any backing record
    pub fn with_listed_only(mut self, unit: &str, id: &str) -> Self {
        self.scopes
            .entry(unit.to_string())
            .or_default()
            .push(id.to_string());
        self
    }

    pub fn with_transient_item(mut self, id: &str) -> Self {
        self.transient_items.insert(id.to_string());
        self
    }

    pub fn with_flaky_item(mut self, id: &str) -> Self {
        self.flaky_items.insert(id.to_string());
        self
    }

    pub fn with_failing_unit(mut self, unit: &str) -> Self {
        self.failing_units.insert(unit.to_string());
        self
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.get()
    }

    pub fn scope_calls(&self) -> usize {
        self.scope_calls.get()
    }

    /// A small two-era catalog with real category, lineage and rarity overlap
    pub fn sample() -> Self {
        let mut catalog = Self::new();
        let rows: &[(&str, &str, &[&str], Option<&str>, bool)] = &[
            ("1", "bulbasaur", &["grass", "poison"], Some("1"), false),
            ("1", "ivysaur", &["grass", "poison"], Some("1"), false),
            ("1", "venusaur", &["grass", "poison"], Some("1"), false),
            ("1", "oddish", &["grass", "poison"], Some("18"), false),
            ("1", "bellsprout", &["grass", "poison"], Some("29"), false),
            ("1", "charmander", &["fire"], Some("2"), false),
            ("1", "charmeleon", &["fire"], Some("2"), false),
            ("1", "charizard", &["fire", "flying"], Some("2"), false),
            ("1", "vulpix", &["fire"], Some("38"), false),
            ("1", "growlithe", &["fire"], Some("59"), false),
            ("1", "squirtle", &["water"], Some("3"), false),
            ("1", "wartortle", &["water"], Some("3"), false),
            ("1", "blastoise", &["water"], Some("3"), false),
            ("1", "psyduck", &["water"], Some("47"), false),
            ("1", "articuno", &["ice", "flying"], None, true),
            ("1", "zapdos", &["electric", "flying"], None, true),
            ("1", "moltres", &["fire", "flying"], None, true),
            ("1", "mewtwo", &["psychic"], None, true),
            ("1", "mew", &["psychic"], None, true),
            ("2", "chikorita", &["grass"], Some("79"), false),
            ("2", "cyndaquil", &["fire"], Some("80"), false),
            ("2", "totodile", &["water"], Some("81"), false),
            ("2", "pichu", &["electric"], Some("10"), false),
            ("2", "lugia", &["psychic", "flying"], None, true),
            ("2", "ho-oh", &["fire", "flying"], None, true),
        ];
        for (unit, id, categories, lineage, rare) in rows {
            let era = if *unit == "1" { "generation-i" } else { "generation-ii" };
            catalog = catalog.with_item(
                unit,
                ItemRecord {
                    id: id.to_string(),
                    categories: categories.iter().map(|c| c.to_string()).collect(),
                    era: Some(era.to_string()),
                    rare: *rare,
                    lineage: lineage.map(str::to_string),
                },
            );
        }
        catalog
    }
}

#[async_trait(?Send)]
impl MetadataProvider for MemoryCatalog {
    async fn get_item(&self, id: &str) -> Result<ItemRecord, ProviderError> {
        self.item_calls.set(self.item_calls.get() + 1);
        if self.transient_items.contains(id) {
            return Err(ProviderError::Transient(format!("{} timed out", id)));
        }
        if self.flaky_items.contains(id) && self.flaky_seen.borrow_mut().insert(id.to_string()) {
            return Err(ProviderError::Transient(format!("{} timed out", id)));
        }
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn list_scope(&self, unit: &str) -> Result<Vec<String>, ProviderError> {
        self.scope_calls.set(self.scope_calls.get() + 1);
        if self.failing_units.contains(unit) {
            return Err(ProviderError::Transient(format!("scope {} unavailable", unit)));
        }
        self.scopes
            .get(unit)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(unit.to_string()))
    }
}

/// Record helper for hand-built fixtures
pub fn record(id: &str, categories: &[&str], lineage: Option<&str>, rare: bool) -> ItemRecord {
    ItemRecord {
        id: id.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        era: None,
        rare,
        lineage: lineage.map(str::to_string),
    }
}
