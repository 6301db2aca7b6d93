//! Batch recache sweep
//!
//! Periodic jobs walk every stored list of a kind and force the update path
//! regardless of freshness. The sweep is partial-failure-tolerant: a list
//! that fails to refresh is counted and skipped, never aborting the rest.

use crate::error::Result;
use crate::model::ListKind;
use crate::sync::CacheSynchronizer;
use std::sync::Arc;

/// Outcome of one sweep over a list kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Lists enumerated.
    pub processed: usize,
    /// Lists successfully refreshed.
    pub refreshed: usize,
    /// Lists whose refresh failed and was skipped.
    pub failed: usize,
}

/// Scheduler hook that re-caches every stored list of a kind.
pub struct RecacheSweep {
    synchronizer: Arc<CacheSynchronizer>,
}

impl RecacheSweep {
    pub fn new(synchronizer: Arc<CacheSynchronizer>) -> Self {
        Self { synchronizer }
    }

    /// Force-refresh every stored list of the given kind.
    ///
    /// Freshness is deliberately not consulted: the batch jobs exist to
    /// refresh on a schedule independent of per-request staleness checks.
    /// Wishlist sweeps never notify (the synchronizer only diffs
    /// tradelists). Errors enumerating the store abort the sweep; per-item
    /// refresh errors do not.
    pub async fn recache_all(&self, kind: ListKind) -> Result<SweepReport> {
        let lists = self.synchronizer.store().list_all(kind).await?;
        let mut report = SweepReport::default();

        for list in lists {
            report.processed += 1;
            let list_id = list.list_id.clone();
            match self.synchronizer.refresh(list, kind).await {
                Ok(_) => report.refreshed += 1,
                Err(e) => {
                    log::warn!("recache of {kind} '{list_id}' failed: {e}");
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "{kind} sweep complete: {} processed, {} refreshed, {} failed",
            report.processed,
            report.refreshed,
            report.failed
        );
        Ok(report)
    }
}
