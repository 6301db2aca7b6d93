//! Builders for creating test entities

use chrono::{Duration, Utc};
use deckbox_sync_core::model::{build_card_map, normalize_name, CardList, User};
use std::collections::HashMap;

/// Build a cached list snapshot.
///
/// `cached_minutes_ago: None` produces a never-cached entry; `Some(n)`
/// stamps it `n` minutes in the past.
pub fn card_list(
    list_id: &str,
    owner_name: &str,
    rows: &[(&str, i64)],
    cached_minutes_ago: Option<i64>,
) -> CardList {
    CardList {
        list_id: list_id.to_string(),
        owner_name: normalize_name(owner_name),
        last_cached_at: cached_minutes_ago.map(|minutes| Utc::now() - Duration::minutes(minutes)),
        cards: build_card_map(rows.iter().map(|(name, count)| (name.to_string(), *count))),
    }
}

/// Start building a user.
pub fn user(telegram: &str) -> UserBuilder {
    UserBuilder::new(telegram)
}

/// Builder for user entities
pub struct UserBuilder {
    telegram: String,
    chat_id: Option<String>,
    deckbox_name: Option<String>,
    subscriptions: HashMap<String, bool>,
}

impl UserBuilder {
    pub fn new(telegram: &str) -> Self {
        Self {
            telegram: telegram.to_string(),
            chat_id: None,
            deckbox_name: None,
            subscriptions: HashMap::new(),
        }
    }

    /// Give the user a delivery address.
    pub fn with_chat_id(mut self, chat_id: &str) -> Self {
        self.chat_id = Some(chat_id.to_string());
        self
    }

    /// Register the user's own deckbox account.
    pub fn with_deckbox_name(mut self, name: &str) -> Self {
        self.deckbox_name = Some(normalize_name(name));
        self
    }

    /// Subscribe the user to a tradelist owner.
    pub fn subscribed_to(mut self, owner_name: &str) -> Self {
        self.subscriptions.insert(normalize_name(owner_name), true);
        self
    }

    pub fn build(self) -> User {
        User {
            telegram: self.telegram,
            chat_id: self.chat_id,
            deckbox_name: self.deckbox_name,
            deckbox_subscriptions: self.subscriptions,
        }
    }
}
