//! Failure-injecting store wrapper

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deckbox_sync_core::model::{CardList, ListKind, User};
use deckbox_sync_core::store::ListStore;
use deckbox_sync_core::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Wraps any `ListStore` and can be switched to fail writes, for testing
/// the `StoreWriteFailed` paths.
pub struct FlakyStore {
    inner: Arc<dyn ListStore>,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn ListStore>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn writes_fail(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListStore for FlakyStore {
    async fn get(&self, list_id: &str, kind: ListKind) -> Result<Option<CardList>> {
        self.inner.get(list_id, kind).await
    }

    async fn find_by_owner(&self, owner_name: &str, kind: ListKind) -> Result<Option<CardList>> {
        self.inner.find_by_owner(owner_name, kind).await
    }

    async fn insert(&self, kind: ListKind, list: &CardList) -> Result<()> {
        if self.writes_fail() {
            return Err(Error::store_write_failed("scripted write failure"));
        }
        self.inner.insert(kind, list).await
    }

    async fn update_cards(
        &self,
        list_id: &str,
        kind: ListKind,
        cards: &HashMap<String, u32>,
        last_cached_at: DateTime<Utc>,
    ) -> Result<bool> {
        if self.writes_fail() {
            return Err(Error::store_write_failed("scripted write failure"));
        }
        self.inner
            .update_cards(list_id, kind, cards, last_cached_at)
            .await
    }

    async fn list_all(&self, kind: ListKind) -> Result<Vec<CardList>> {
        self.inner.list_all(kind).await
    }

    async fn subscribers(&self, owner_name: &str) -> Result<Vec<User>> {
        self.inner.subscribers(owner_name).await
    }

    async fn user_by_deckbox_name(&self, deckbox_name: &str) -> Result<Option<User>> {
        self.inner.user_by_deckbox_name(deckbox_name).await
    }
}
