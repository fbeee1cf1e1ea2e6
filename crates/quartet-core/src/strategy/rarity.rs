//! Rarity-match over the configured rarity predicate.

use super::{pad_from_tail, shuffled, Group, GroupRule};
use crate::config::RarityRule;
use crate::lookup::Lookup;
use crate::provider::MetadataProvider;
use tracing::debug;

/// Fewest rare items that still make a meaningful group
const MIN_RARE: usize = 2;

pub(super) async fn build<P: MetadataProvider + ?Sized>(
    pool: &[String],
    size: usize,
    lookup: &mut Lookup<'_, P>,
) -> Option<Group> {
    let rule = lookup.config().rarity.clone();
    let budget = lookup.config().samples_for(pool.len());

    let mut rare: Vec<String> = Vec::with_capacity(size);
    for id in shuffled(pool, lookup).into_iter().take(budget) {
        if rare.len() == size {
            break;
        }
        if is_rare(&rule, &id, lookup).await {
            rare.push(id);
        }
    }

    if rare.len() < MIN_RARE {
        debug!(found = rare.len(), "too few rare items");
        return None;
    }

    debug!(found = rare.len(), size, "rarity group");
    pad_from_tail(&mut rare, pool, size);
    (rare.len() == size).then(|| Group::new(rare, GroupRule::Rarity))
}

async fn is_rare<P: MetadataProvider + ?Sized>(
    rule: &RarityRule,
    id: &str,
    lookup: &mut Lookup<'_, P>,
) -> bool {
    if rule.listed(id) {
        return true;
    }
    if !rule.uses_attribute() {
        return false;
    }
    lookup.record(id).await.is_some_and(|r| r.rare)
}

#[cfg(test)]
mod tests {
    use crate::config::{GeneratorConfig, RarityRule};
    use crate::lookup::Lookup;
    use crate::strategy::{GroupRule, Strategy};
    use crate::testing::{record, MemoryCatalog};
    use futures::executor::block_on;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_item("1", record("l1", &["psychic"], None, true))
            .with_item("1", record("l2", &["ice"], None, true))
            .with_item("1", record("l3", &["fire"], None, true))
            .with_item("1", record("c1", &["normal"], None, false))
            .with_item("1", record("c2", &["normal"], None, false))
            .with_item("1", record("c3", &["bug"], None, false))
    }

    #[test]
    fn test_rare_items_padded_from_tail() {
        let catalog = catalog();
        let pool = ids(&["l1", "c1", "l2", "c2", "l3", "c3"]);
        let config = GeneratorConfig::default().with_seed(5);
        let mut lookup = Lookup::new(&catalog, &config);

        let group = block_on(Strategy::Rarity.attempt(&pool, 4, &mut lookup)).unwrap();
        assert_eq!(group.rule, GroupRule::Rarity);
        assert_eq!(group.len(), 4);
        assert!(group.contains("l1") && group.contains("l2") && group.contains("l3"));
        assert!(group.contains("c3"));
    }

    #[test]
    fn test_single_rare_item_is_skipped() {
        let catalog = catalog();
        let pool = ids(&["l1", "c1", "c2", "c3"]);
        let config = GeneratorConfig::default().with_seed(5);
        let mut lookup = Lookup::new(&catalog, &config);

        assert!(block_on(Strategy::Rarity.attempt(&pool, 4, &mut lookup)).is_none());
    }

    #[test]
    fn test_curated_rule_skips_metadata() {
        let catalog = catalog();
        let pool = ids(&["c1", "c2", "c3", "l1", "l2"]);
        let config = GeneratorConfig {
            rarity: RarityRule::Curated(["c1".to_string(), "c2".to_string()].into_iter().collect()),
            ..GeneratorConfig::default().with_seed(1)
        };
        let mut lookup = Lookup::new(&catalog, &config);

        let group = block_on(Strategy::Rarity.attempt(&pool, 4, &mut lookup)).unwrap();
        assert!(group.contains("c1") && group.contains("c2"));
        assert_eq!(catalog.item_calls(), 0);
    }

    #[test]
    fn test_attribute_or_curated() {
        let catalog = catalog();
        let pool = ids(&["c1", "l1", "c2", "c3"]);
        let config = GeneratorConfig {
            rarity: RarityRule::AttributeOrCurated(["c3".to_string()].into_iter().collect()),
            ..GeneratorConfig::default().with_seed(7)
        };
        let mut lookup = Lookup::new(&catalog, &config);

        let group = block_on(Strategy::Rarity.attempt(&pool, 4, &mut lookup)).unwrap();
        assert!(group.contains("l1") && group.contains("c3"));
    }
}
