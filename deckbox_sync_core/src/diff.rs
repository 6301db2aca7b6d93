//! Snapshot diffing for notification triggering
//!
//! Only additions of entirely new card names count: a quantity increase on
//! an already-present name is not a trigger. This mirrors the observed
//! behavior of the source system and is intentional.

use std::collections::{BTreeMap, HashMap};

/// Card names present in `new` but absent from `old`, with their new
/// quantities.
pub fn newly_added(
    old: &HashMap<String, u32>,
    new: &HashMap<String, u32>,
) -> BTreeMap<String, u32> {
    new.iter()
        .filter(|(name, _)| !old.contains_key(*name))
        .map(|(name, qty)| (name.clone(), *qty))
        .collect()
}

/// Subset of `added` that appears in a subscriber's wishlist.
pub fn wishlist_hits(
    added: &BTreeMap<String, u32>,
    wishlist: &HashMap<String, u32>,
) -> BTreeMap<String, u32> {
    added
        .iter()
        .filter(|(name, _)| wishlist.contains_key(*name))
        .map(|(name, qty)| (name.clone(), *qty))
        .collect()
}
