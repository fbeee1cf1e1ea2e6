//! Category-match: the first primary-category bucket to fill wins.

use super::{scan_buckets, Group, GroupRule};
use crate::lookup::Lookup;
use crate::provider::MetadataProvider;
use tracing::debug;

pub(super) async fn build<P: MetadataProvider + ?Sized>(
    pool: &[String],
    size: usize,
    lookup: &mut Lookup<'_, P>,
) -> Option<Group> {
    let scan = scan_buckets(pool, size, lookup, |record| {
        record.primary_category().map(str::to_string)
    })
    .await;

    match scan.full {
        Some((tag, members)) => {
            debug!(%tag, "category bucket filled");
            Some(Group::new(members, GroupRule::Category(tag)))
        }
        None => {
            debug!(buckets = scan.buckets.len(), "no category bucket reached the target size");
            None
        }
    }
}
