//! Lineage-match, plus the category filler used to complete partial lineages.

use super::{pad_from_tail, scan_buckets, shuffled, Group, GroupRule};
use crate::lookup::Lookup;
use crate::provider::MetadataProvider;
use tracing::debug;

/// Smallest partial lineage worth completing with the filler
const MIN_PARTIAL_LINEAGE: usize = 2;

pub(super) async fn build<P: MetadataProvider + ?Sized>(
    pool: &[String],
    size: usize,
    lookup: &mut Lookup<'_, P>,
) -> Option<Group> {
    let scan = scan_buckets(pool, size, lookup, |record| {
        record.lineage_key().map(str::to_string)
    })
    .await;

    if let Some((lineage, members)) = scan.full {
        debug!(%lineage, "lineage bucket filled");
        return Some(Group::new(members, GroupRule::Lineage(lineage)));
    }

    let (lineage, partial) = scan.best_partial(MIN_PARTIAL_LINEAGE)?.clone();
    let needed = size - partial.len();
    debug!(%lineage, found = partial.len(), needed, "completing partial lineage");

    let extra = fill_from_category(&partial[0], needed, &partial, pool, lookup).await;
    let mut members = partial;
    members.extend(extra);
    (members.len() == size).then(|| Group::new(members, GroupRule::Lineage(lineage)))
}

/// Pick `needed` pool items to accompany `reference`.
///
/// Prefers items sharing the reference's primary category tag and pads with
/// arbitrary items from the pool's tail when too few share it. Items in
/// `exclude` are never picked.
pub async fn fill_from_category<P: MetadataProvider + ?Sized>(
    reference: &str,
    needed: usize,
    exclude: &[String],
    pool: &[String],
    lookup: &mut Lookup<'_, P>,
) -> Vec<String> {
    let mut picked: Vec<String> = Vec::with_capacity(needed);
    if needed == 0 {
        return picked;
    }

    let tag = lookup
        .record(reference)
        .await
        .and_then(|r| r.primary_category().map(str::to_string));

    if let Some(tag) = tag {
        let budget = lookup.config().samples_for(pool.len());
        for id in shuffled(pool, lookup).into_iter().take(budget) {
            if picked.len() == needed {
                break;
            }
            if exclude.contains(&id) {
                continue;
            }
            let matches = lookup
                .record(&id)
                .await
                .is_some_and(|r| r.primary_category() == Some(tag.as_str()));
            if matches {
                picked.push(id);
            }
        }
        debug!(%tag, matched = picked.len(), needed, "filler category pass");
    }

    if picked.len() < needed {
        let mut padded: Vec<String> = exclude.to_vec();
        padded.extend(picked);
        pad_from_tail(&mut padded, pool, exclude.len() + needed);
        picked = padded.split_off(exclude.len());
    }
    picked
}
