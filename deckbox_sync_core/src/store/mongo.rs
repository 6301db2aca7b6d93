//! MongoDB store implementation
//!
//! One collection per list kind plus a `users` collection. Cache timestamps
//! are stored through the model's serde form, so documents written here read
//! back with the same structs.

use crate::error::{Error, Result};
use crate::model::{normalize_name, CardList, ListKind, User};
use crate::store::ListStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::collections::HashMap;

/// MongoDB-backed `ListStore` implementation.
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect to a MongoDB deployment and select the given database.
    pub async fn connect(url: &str, database: &str) -> Result<Self> {
        let options = ClientOptions::parse(url).await?;
        let client = Client::with_options(options)?;
        Ok(Self {
            database: client.database(database),
        })
    }

    /// Build a store over an already-connected database handle.
    pub fn with_database(database: Database) -> Self {
        Self { database }
    }

    fn lists(&self, kind: ListKind) -> Collection<CardList> {
        self.database.collection::<CardList>(kind.collection_name())
    }

    fn users(&self) -> Collection<User> {
        self.database.collection::<User>("users")
    }
}

#[async_trait]
impl ListStore for MongoStore {
    async fn get(&self, list_id: &str, kind: ListKind) -> Result<Option<CardList>> {
        let filter = doc! { "deckbox_id": list_id.to_lowercase() };
        Ok(self.lists(kind).find_one(filter, None).await?)
    }

    async fn find_by_owner(&self, owner_name: &str, kind: ListKind) -> Result<Option<CardList>> {
        let filter = doc! { "account_name": normalize_name(owner_name) };
        Ok(self.lists(kind).find_one(filter, None).await?)
    }

    async fn insert(&self, kind: ListKind, list: &CardList) -> Result<()> {
        self.lists(kind)
            .insert_one(list, None)
            .await
            .map_err(|e| Error::store_write_failed(e.to_string()))?;
        Ok(())
    }

    async fn update_cards(
        &self,
        list_id: &str,
        kind: ListKind,
        cards: &HashMap<String, u32>,
        last_cached_at: DateTime<Utc>,
    ) -> Result<bool> {
        let cards_bson = mongodb::bson::to_bson(cards)
            .map_err(|e| Error::store_write_failed(e.to_string()))?;
        let cached_bson = mongodb::bson::to_bson(&last_cached_at)
            .map_err(|e| Error::store_write_failed(e.to_string()))?;
        let filter = doc! { "deckbox_id": list_id.to_lowercase() };
        let update = doc! { "$set": { "cards": cards_bson, "last_cached": cached_bson } };
        let result = self
            .lists(kind)
            .update_one(filter, update, None)
            .await
            .map_err(|e| Error::store_write_failed(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    async fn list_all(&self, kind: ListKind) -> Result<Vec<CardList>> {
        let cursor = self.lists(kind).find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn subscribers(&self, owner_name: &str) -> Result<Vec<User>> {
        // Subscriptions are a sub-document keyed by owner name, so presence
        // of the key is the membership test.
        let mut filter = Document::new();
        filter.insert(
            format!("deckbox_subscriptions.{}", normalize_name(owner_name)),
            doc! { "$exists": true },
        );
        let cursor = self.users().find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn user_by_deckbox_name(&self, deckbox_name: &str) -> Result<Option<User>> {
        let filter = doc! { "deckbox_name": normalize_name(deckbox_name) };
        Ok(self.users().find_one(filter, None).await?)
    }
}
