use super::{Group, GroupRule};
use crate::lookup::Lookup;
use crate::provider::MetadataProvider;
use rand::seq::SliceRandom;

/// Uniformly random subset of whatever remains
pub(super) fn build<P: MetadataProvider + ?Sized>(
    pool: &[String],
    size: usize,
    lookup: &mut Lookup<'_, P>,
) -> Option<Group> {
    if pool.len() < size {
        return None;
    }
    let members: Vec<String> = pool.choose_multiple(lookup.rng(), size).cloned().collect();
    Some(Group::new(members, GroupRule::Random))
}

#[cfg(test)]
mod tests {
    use crate::config::GeneratorConfig;
    use crate::lookup::Lookup;
    use crate::strategy::{GroupRule, Strategy};
    use crate::testing::MemoryCatalog;
    use futures::executor::block_on;
    use std::collections::HashSet;

    #[test]
    fn test_random_group_is_distinct_subset() {
        let catalog = MemoryCatalog::new();
        let pool: Vec<String> = (0..10).map(|i| format!("r{}", i)).collect();
        let config = GeneratorConfig::default().with_seed(11);
        let mut lookup = Lookup::new(&catalog, &config);

        let group = block_on(Strategy::Random.attempt(&pool, 4, &mut lookup)).unwrap();
        assert_eq!(group.rule, GroupRule::Random);
        let unique: HashSet<&String> = group.members.iter().collect();
        assert_eq!(unique.len(), 4);
        assert!(group.members.iter().all(|m| pool.contains(m)));
        assert_eq!(catalog.item_calls(), 0);
    }

    #[test]
    fn test_random_needs_enough_items() {
        let catalog = MemoryCatalog::new();
        let pool: Vec<String> = (0..3).map(|i| format!("r{}", i)).collect();
        let config = GeneratorConfig::default();
        let mut lookup = Lookup::new(&catalog, &config);

        assert!(block_on(Strategy::Random.attempt(&pool, 4, &mut lookup)).is_none());
    }
}
