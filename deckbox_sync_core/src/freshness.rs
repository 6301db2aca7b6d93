//! Freshness evaluation for cached lists
//!
//! Read-only: deciding that an entry is stale never mutates anything; the
//! synchronizer owns the follow-up refresh.

use crate::error::Result;
use crate::model::{CardList, ListKind};
use crate::store::ListStore;
use chrono::{DateTime, Utc};

/// Decides whether a cached entry is still fresh.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessEvaluator {
    threshold_minutes: i64,
}

impl FreshnessEvaluator {
    pub fn new(threshold_minutes: i64) -> Self {
        Self { threshold_minutes }
    }

    pub fn threshold_minutes(&self) -> i64 {
        self.threshold_minutes
    }

    /// Whether a loaded entry is fresh as of `now`.
    ///
    /// A missing entry and an entry that was never successfully cached are
    /// both stale. The boundary is exclusive: an entry exactly
    /// `threshold_minutes` old is already stale.
    pub fn is_fresh_at(&self, entry: Option<&CardList>, now: DateTime<Utc>) -> bool {
        let Some(list) = entry else {
            return false;
        };
        let Some(cached_at) = list.last_cached_at else {
            return false;
        };
        let elapsed_minutes = (now - cached_at).num_minutes();
        elapsed_minutes < self.threshold_minutes
    }

    /// Whether a loaded entry is fresh right now.
    pub fn is_fresh(&self, entry: Option<&CardList>) -> bool {
        self.is_fresh_at(entry, Utc::now())
    }

    /// Load an entry by id and kind and report its freshness.
    pub async fn check(
        &self,
        store: &dyn ListStore,
        list_id: &str,
        kind: ListKind,
    ) -> Result<bool> {
        let entry = store.get(list_id, kind).await?;
        Ok(self.is_fresh(entry.as_ref()))
    }
}
