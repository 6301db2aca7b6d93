//! Data model for cached lists and their subscribers
//!
//! Field names mirror the stored document shape (`deckbox_id`,
//! `account_name`, `last_cached`) so the same structs serialize straight
//! into the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a cached list.
///
/// Every list is exactly one of the two; the kind selects the collection a
/// list lives in and whether a refresh triggers notifications (tradelists
/// only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Tradelist,
    Wishlist,
}

impl ListKind {
    /// Collection holding lists of this kind.
    pub fn collection_name(&self) -> &'static str {
        match self {
            ListKind::Tradelist => "deckbox_tradelists",
            ListKind::Wishlist => "deckbox_wishlists",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Tradelist => write!(f, "tradelist"),
            ListKind::Wishlist => write!(f, "wishlist"),
        }
    }
}

impl std::str::FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tradelist" => Ok(ListKind::Tradelist),
            "wishlist" => Ok(ListKind::Wishlist),
            other => Err(format!("unknown list kind '{other}'")),
        }
    }
}

/// One cached tradelist or wishlist snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardList {
    /// Opaque identifier assigned by the remote source; immutable.
    #[serde(rename = "deckbox_id")]
    pub list_id: String,
    /// Lowercase-normalized owner account name; unique within a kind.
    #[serde(rename = "account_name")]
    pub owner_name: String,
    /// Timestamp of the most recent successful refresh; absent before the
    /// first successful fetch.
    #[serde(rename = "last_cached", skip_serializing_if = "Option::is_none")]
    pub last_cached_at: Option<DateTime<Utc>>,
    /// Lowercase card name -> quantity; quantities are always >= 1.
    #[serde(default)]
    pub cards: HashMap<String, u32>,
}

impl CardList {
    /// Create a list snapshot from raw fetched rows, stamped now.
    pub fn from_fetched(
        list_id: impl Into<String>,
        owner_name: &str,
        cards: HashMap<String, u32>,
        cached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            list_id: list_id.into(),
            owner_name: normalize_name(owner_name),
            last_cached_at: Some(cached_at),
            cards,
        }
    }
}

/// Lowercase-normalize an owner/account name.
///
/// The whole system treats ownership names as case-insensitive keys; every
/// comparison and every stored value goes through here first.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Build a card map from raw `(name, count)` rows.
///
/// Names are lowercased; duplicate occurrences of the same name are summed,
/// never overwritten; rows with non-positive counts are dropped so stored
/// quantities are always >= 1.
pub fn build_card_map<I, S>(rows: I) -> HashMap<String, u32>
where
    I: IntoIterator<Item = (S, i64)>,
    S: AsRef<str>,
{
    let mut cards: HashMap<String, u32> = HashMap::new();
    for (name, count) in rows {
        if count <= 0 {
            continue;
        }
        let key = name.as_ref().trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        *cards.entry(key).or_insert(0) += count as u32;
    }
    cards
}

/// A user entity, referenced read-only by the engine.
///
/// Subscriptions reference tradelists by owner name, not by list id, so a
/// rotated remote id does not break existing subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Messenger account name the user registered with.
    pub telegram: String,
    /// Delivery address for notifications; absent until the user has opened
    /// a direct chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// The user's own deckbox account; its wishlist is the notification
    /// match target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deckbox_name: Option<String>,
    /// Lowercase tradelist owner names the user watches.
    #[serde(default)]
    pub deckbox_subscriptions: HashMap<String, bool>,
}

impl User {
    pub fn is_subscribed_to(&self, owner_name: &str) -> bool {
        self.deckbox_subscriptions
            .contains_key(&normalize_name(owner_name))
    }
}
