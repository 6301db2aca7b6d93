//! Document-store seam for cached lists and users
//!
//! The engine only needs a narrow key-value-ish interface; anything that
//! satisfies `ListStore` can back it. `MemoryStore` serves tests and local
//! runs, `MongoStore` is the production implementation.

use crate::error::Result;
use crate::model::{CardList, ListKind, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Storage interface for cached lists and their subscribers.
///
/// List ids and owner names are case-insensitive keys; implementations
/// lowercase them on every read and write.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Fetch a list by remote id and kind.
    async fn get(&self, list_id: &str, kind: ListKind) -> Result<Option<CardList>>;

    /// Fetch a list by its owner's account name and kind.
    async fn find_by_owner(&self, owner_name: &str, kind: ListKind) -> Result<Option<CardList>>;

    /// Insert a brand-new list document.
    async fn insert(&self, kind: ListKind, list: &CardList) -> Result<()>;

    /// Overwrite the cards and cache timestamp of an existing list.
    ///
    /// Returns whether a document was matched.
    async fn update_cards(
        &self,
        list_id: &str,
        kind: ListKind,
        cards: &HashMap<String, u32>,
        last_cached_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Enumerate every stored list of the given kind.
    async fn list_all(&self, kind: ListKind) -> Result<Vec<CardList>>;

    /// Users whose subscription set contains the given tradelist owner.
    async fn subscribers(&self, owner_name: &str) -> Result<Vec<User>>;

    /// Look up a user by their registered deckbox account name.
    async fn user_by_deckbox_name(&self, deckbox_name: &str) -> Result<Option<User>>;
}
