//! Mock remote list fetcher
//!
//! Scripted per-list results plus fetch counting, so tests can assert both
//! what the synchronizer received and how often it went to the remote
//! source.

use async_trait::async_trait;
use deckbox_sync_core::fetch::{FetchedList, RemoteListFetcher};
use deckbox_sync_core::model::build_card_map;
use deckbox_sync_core::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Cards(Vec<(String, i64)>),
    Unavailable,
    NotFound,
}

/// Mock implementation of `RemoteListFetcher` with scripted results.
#[derive(Debug, Default)]
pub struct MockFetcher {
    scripts: Mutex<HashMap<String, Scripted>>,
    total_fetches: AtomicUsize,
    per_list_fetches: Mutex<HashMap<String, usize>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful fetch returning the given raw rows.
    ///
    /// Rows go through the same summation/normalization a real fetch does,
    /// so duplicate names are allowed.
    pub fn expect_cards(&self, list_id: &str, rows: &[(&str, i64)]) {
        let rows = rows
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect();
        self.scripts
            .lock()
            .unwrap()
            .insert(list_id.to_string(), Scripted::Cards(rows));
    }

    /// Script a `RemoteUnavailable` failure for the given list.
    pub fn expect_unavailable(&self, list_id: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(list_id.to_string(), Scripted::Unavailable);
    }

    /// Script a `RemoteListNotFound` failure for the given list.
    pub fn expect_not_found(&self, list_id: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(list_id.to_string(), Scripted::NotFound);
    }

    /// Total number of fetches across all lists.
    pub fn fetch_count(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }

    /// Number of fetches for one list.
    pub fn fetch_count_for(&self, list_id: &str) -> usize {
        self.per_list_fetches
            .lock()
            .unwrap()
            .get(list_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteListFetcher for MockFetcher {
    async fn fetch_list(&self, list_id: &str) -> Result<FetchedList> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        *self
            .per_list_fetches
            .lock()
            .unwrap()
            .entry(list_id.to_string())
            .or_insert(0) += 1;

        let script = self.scripts.lock().unwrap().get(list_id).cloned();
        match script {
            Some(Scripted::Cards(rows)) => Ok(FetchedList {
                cards: build_card_map(rows),
            }),
            Some(Scripted::Unavailable) => {
                Err(Error::remote_unavailable("scripted remote failure"))
            }
            Some(Scripted::NotFound) | None => Err(Error::remote_list_not_found(list_id)),
        }
    }
}
