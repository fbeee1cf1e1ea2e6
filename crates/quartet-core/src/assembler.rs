//! Board assembler.
//!
//! Runs the strategies in fixed priority order over a pool it exclusively
//! owns, removing each group's members as soon as the group is claimed. That
//! removal is what keeps the final groups pairwise disjoint.

use crate::error::GenerateError;
use crate::lookup::Lookup;
use crate::provider::MetadataProvider;
use crate::strategy::{Group, Strategy};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Strategies tried once each, before the completion loop
const OPENING_PLAN: [Strategy; 3] = [Strategy::Category, Strategy::Lineage, Strategy::Rarity];

/// A finished partition plus its shuffled board layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Hidden solution, indexed by group number
    pub groups: Vec<Group>,
    /// Identifiers in display order
    pub layout: Vec<String>,
}

impl Puzzle {
    /// Group index owning `id`
    pub fn group_of(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }

    /// identifier -> group index
    pub fn solution(&self) -> HashMap<&str, usize> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(index, group)| group.members.iter().map(move |m| (m.as_str(), index)))
            .collect()
    }
}

pub struct BoardAssembler<'l, 'a, P: ?Sized> {
    pool: Vec<String>,
    groups: Vec<Group>,
    lookup: &'l mut Lookup<'a, P>,
}

impl<'l, 'a, P: MetadataProvider + ?Sized> BoardAssembler<'l, 'a, P> {
    /// Take ownership of a working copy of the pool
    pub fn new(pool: Vec<String>, lookup: &'l mut Lookup<'a, P>) -> Self {
        Self {
            pool,
            groups: Vec::new(),
            lookup,
        }
    }

    /// Produce the configured number of disjoint groups and shuffle them onto a board
    pub async fn assemble(mut self) -> Result<Puzzle, GenerateError> {
        let size = self.lookup.config().group_size;
        let count = self.lookup.config().group_count;
        let required = size * count;

        if self.pool.len() < required {
            return Err(GenerateError::InsufficientPool {
                found: self.pool.len(),
                required,
            });
        }

        for strategy in OPENING_PLAN {
            if self.groups.len() == count {
                break;
            }
            self.run(strategy, size).await;
        }

        while self.groups.len() < count {
            if self.run(Strategy::Category, size).await {
                continue;
            }
            if !self.run(Strategy::Random, size).await {
                // unreachable while the pool holds at least the remaining need
                return Err(GenerateError::InsufficientPool {
                    found: self.pool.len(),
                    required: (count - self.groups.len()) * size,
                });
            }
        }

        let mut layout: Vec<String> = self
            .groups
            .iter()
            .flat_map(|g| g.members.iter().cloned())
            .collect();
        layout.shuffle(self.lookup.rng());

        info!(
            rules = ?self.groups.iter().map(|g| g.rule.to_string()).collect::<Vec<_>>(),
            "board assembled"
        );
        Ok(Puzzle {
            groups: self.groups,
            layout,
        })
    }

    /// Run one strategy and claim its group. Returns whether a group was claimed.
    async fn run(&mut self, strategy: Strategy, size: usize) -> bool {
        match strategy.attempt(&self.pool, size, self.lookup).await {
            Some(group) => {
                debug!(%strategy, rule = %group.rule, members = ?group.members, "group claimed");
                self.claim(group);
                true
            }
            None => {
                debug!(%strategy, remaining = self.pool.len(), "strategy produced no group");
                false
            }
        }
    }

    fn claim(&mut self, group: Group) {
        debug_assert!(group.members.iter().all(|m| self.pool.contains(m)));
        self.pool.retain(|id| !group.contains(id));
        self.groups.push(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::strategy::GroupRule;
    use crate::testing::{record, MemoryCatalog};
    use futures::executor::block_on;
    use std::collections::HashSet;

    fn assemble(catalog: &MemoryCatalog, pool: Vec<String>, seed: u64) -> Result<Puzzle, GenerateError> {
        let config = GeneratorConfig::default().with_seed(seed);
        let mut lookup = Lookup::new(catalog, &config);
        block_on(BoardAssembler::new(pool, &mut lookup).assemble())
    }

    fn assert_partition(puzzle: &Puzzle) {
        assert_eq!(puzzle.groups.len(), 4);
        let mut all = HashSet::new();
        for group in &puzzle.groups {
            assert_eq!(group.len(), 4);
            for id in &group.members {
                assert!(all.insert(id.clone()), "{} appears twice", id);
            }
        }
        assert_eq!(all.len(), 16);
        let layout: HashSet<String> = puzzle.layout.iter().cloned().collect();
        assert_eq!(puzzle.layout.len(), 16);
        assert_eq!(layout, all);
    }

    #[test]
    fn test_sample_catalog_produces_partition() {
        let catalog = MemoryCatalog::sample();
        let pool: Vec<String> = block_on(crate::pool::CandidatePool::build(
            &catalog,
            &crate::config::Scope::eras(1, 2),
            16,
        ))
        .unwrap()
        .into_ids();

        for seed in 0..20 {
            let puzzle = assemble(&catalog, pool.clone(), seed).unwrap();
            assert_partition(&puzzle);
            assert!(matches!(puzzle.groups[0].rule, GroupRule::Category(_)));
        }
    }

    #[test]
    fn test_rule_free_pool_falls_back() {
        // 16 items, every category distinct, no lineage, 2 rare
        let mut catalog = MemoryCatalog::new();
        let mut pool = Vec::new();
        for i in 0..16 {
            let id = format!("solo{}", i);
            let tag = format!("tag{}", i);
            catalog = catalog.with_item("1", record(&id, &[tag.as_str()], None, i < 2));
            pool.push(id);
        }

        for seed in 0..10 {
            let puzzle = assemble(&catalog, pool.clone(), seed).unwrap();
            assert_partition(&puzzle);
            assert_eq!(puzzle.groups[0].rule, GroupRule::Rarity);
            assert!(puzzle.groups[1..].iter().all(|g| g.rule == GroupRule::Random));
        }
    }

    #[test]
    fn test_unreachable_catalog_still_assembles() {
        let mut catalog = MemoryCatalog::new();
        let mut pool = Vec::new();
        for i in 0..16 {
            let id = format!("ghost{}", i);
            catalog = catalog.with_listed_only("1", &id).with_transient_item(&id);
            pool.push(id);
        }
        let puzzle = assemble(&catalog, pool, 3).unwrap();
        assert_partition(&puzzle);
        assert!(puzzle.groups.iter().all(|g| g.rule == GroupRule::Random));
    }

    #[test]
    fn test_pool_too_small() {
        let catalog = MemoryCatalog::new();
        let pool: Vec<String> = (0..15).map(|i| format!("i{}", i)).collect();
        assert_eq!(
            assemble(&catalog, pool, 0).unwrap_err(),
            GenerateError::InsufficientPool { found: 15, required: 16 }
        );
    }

    #[test]
    fn test_solution_map() {
        let catalog = MemoryCatalog::sample();
        let pool: Vec<String> = block_on(crate::pool::CandidatePool::build(
            &catalog,
            &crate::config::Scope::eras(1, 2),
            16,
        ))
        .unwrap()
        .into_ids();
        let puzzle = assemble(&catalog, pool, 8).unwrap();
        let solution = puzzle.solution();
        assert_eq!(solution.len(), 16);
        for id in &puzzle.layout {
            assert_eq!(solution.get(id.as_str()).copied(), puzzle.group_of(id));
        }
    }
}
