//! In-memory store implementation
//!
//! Backs the engine in tests and local runs. Same normalization rules as
//! the Mongo implementation: ids and owner names are lowercased keys.

use crate::error::Result;
use crate::model::{normalize_name, CardList, ListKind, User};
use crate::store::ListStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory `ListStore` implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: RwLock<HashMap<(ListKind, String), CardList>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user (test/setup helper).
    pub async fn add_user(&self, user: User) {
        self.users.write().await.push(user);
    }

    /// Number of stored lists of a kind (test helper).
    pub async fn count(&self, kind: ListKind) -> usize {
        self.lists
            .read()
            .await
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn get(&self, list_id: &str, kind: ListKind) -> Result<Option<CardList>> {
        let key = (kind, list_id.to_lowercase());
        Ok(self.lists.read().await.get(&key).cloned())
    }

    async fn find_by_owner(&self, owner_name: &str, kind: ListKind) -> Result<Option<CardList>> {
        let owner = normalize_name(owner_name);
        Ok(self
            .lists
            .read()
            .await
            .iter()
            .find(|((k, _), list)| *k == kind && list.owner_name == owner)
            .map(|(_, list)| list.clone()))
    }

    async fn insert(&self, kind: ListKind, list: &CardList) -> Result<()> {
        let key = (kind, list.list_id.to_lowercase());
        self.lists.write().await.insert(key, list.clone());
        Ok(())
    }

    async fn update_cards(
        &self,
        list_id: &str,
        kind: ListKind,
        cards: &HashMap<String, u32>,
        last_cached_at: DateTime<Utc>,
    ) -> Result<bool> {
        let key = (kind, list_id.to_lowercase());
        let mut lists = self.lists.write().await;
        match lists.get_mut(&key) {
            Some(list) => {
                list.cards = cards.clone();
                list.last_cached_at = Some(last_cached_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_all(&self, kind: ListKind) -> Result<Vec<CardList>> {
        Ok(self
            .lists
            .read()
            .await
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, list)| list.clone())
            .collect())
    }

    async fn subscribers(&self, owner_name: &str) -> Result<Vec<User>> {
        let owner = normalize_name(owner_name);
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.is_subscribed_to(&owner))
            .cloned()
            .collect())
    }

    async fn user_by_deckbox_name(&self, deckbox_name: &str) -> Result<Option<User>> {
        let name = normalize_name(deckbox_name);
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.deckbox_name.as_deref() == Some(name.as_str()))
            .cloned())
    }
}
