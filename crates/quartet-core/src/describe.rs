//! Best-effort reconstruction of the trait a group shares.
//!
//! This only looks at final metadata. It may name a different connection than
//! the strategy that formed the group (a padded lineage group often reads as a
//! category match); the true origin is kept separately on the group.

use crate::item::ItemRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared trait shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Connection {
    Category(String),
    Era(String),
    Rare,
    Lineage(String),
    Shared,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Category(tag) => write!(f, "All {} type", crate::item::display_name(tag)),
            Connection::Era(era) => write!(f, "All from {}", crate::item::display_name(era)),
            Connection::Rare => write!(f, "All legendary or mythical"),
            Connection::Lineage(_) => write!(f, "Same evolution family"),
            Connection::Shared => write!(f, "Shared connection"),
        }
    }
}

/// Infer the connection of `members`: primary category, then era, then
/// rarity, then lineage, else a generic fallback.
pub fn describe(members: &[&ItemRecord]) -> Connection {
    if members.is_empty() {
        return Connection::Shared;
    }
    if let Some(tag) = common(members, |r| r.primary_category()) {
        return Connection::Category(tag.to_string());
    }
    if let Some(era) = common(members, |r| r.era.as_deref()) {
        return Connection::Era(era.to_string());
    }
    if members.iter().all(|r| r.rare) {
        return Connection::Rare;
    }
    if let Some(lineage) = common(members, |r| r.lineage.as_deref()) {
        return Connection::Lineage(lineage.to_string());
    }
    Connection::Shared
}

/// The value every member reports, if they all report the same one
fn common<'r, F>(members: &[&'r ItemRecord], key: F) -> Option<&'r str>
where
    F: Fn(&'r ItemRecord) -> Option<&'r str>,
{
    let first = key(*members.first()?)?;
    members
        .iter()
        .all(|r| key(*r) == Some(first))
        .then_some(first)
}
