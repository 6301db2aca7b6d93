//! Cache synchronization orchestrator
//!
//! Owns "ensure a list is present and fresh": existence check, freshness
//! check, remote re-fetch, diff-based subscriber notification and
//! persistence. Constructed with explicit store/fetcher/notifier handles so
//! tests can substitute fakes.

use crate::config::SyncConfig;
use crate::diff;
use crate::error::{Error, Result};
use crate::fetch::RemoteListFetcher;
use crate::freshness::FreshnessEvaluator;
use crate::model::{CardList, ListKind};
use crate::notify::{NotificationEvent, Notifier};
use crate::store::ListStore;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What `ensure_cached` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The list was unknown and has been fetched and inserted.
    Inserted,
    /// The list was stale and has been re-fetched and persisted.
    Refreshed,
    /// The cache was fresh; neither the remote source nor the store was
    /// touched.
    AlreadyFresh,
}

/// Orchestrates cache synchronization for one store/fetcher/notifier trio.
pub struct CacheSynchronizer {
    store: Arc<dyn ListStore>,
    fetcher: Arc<dyn RemoteListFetcher>,
    notifier: Arc<dyn Notifier>,
    freshness: FreshnessEvaluator,
}

impl CacheSynchronizer {
    pub fn new(
        store: Arc<dyn ListStore>,
        fetcher: Arc<dyn RemoteListFetcher>,
        notifier: Arc<dyn Notifier>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            freshness: FreshnessEvaluator::new(config.staleness_threshold_minutes),
        }
    }

    pub fn store(&self) -> &Arc<dyn ListStore> {
        &self.store
    }

    pub fn freshness(&self) -> &FreshnessEvaluator {
        &self.freshness
    }

    /// Ensure a list is cached and fresh.
    ///
    /// Within one freshness window repeated calls perform at most one remote
    /// fetch: a fresh hit is a complete no-op. There is no cross-task lock,
    /// so two tasks observing the same stale entry concurrently may both
    /// refresh it; the last writer wins and duplicate notifications are
    /// tolerated.
    pub async fn ensure_cached(
        &self,
        list_id: &str,
        owner_name: &str,
        kind: ListKind,
    ) -> Result<EnsureOutcome> {
        match self.store.get(list_id, kind).await? {
            None => self.insert_new(list_id, owner_name, kind).await,
            Some(existing) => {
                if self.freshness.is_fresh(Some(&existing)) {
                    log::debug!("{kind} '{list_id}' is fresh, skipping refresh");
                    Ok(EnsureOutcome::AlreadyFresh)
                } else {
                    log::debug!("{kind} '{list_id}' is stale, refreshing");
                    self.refresh(existing, kind).await
                }
            }
        }
    }

    /// Miss path: first successful fetch creates the document.
    ///
    /// A brand-new list has no prior snapshot to diff against, so no
    /// notifications fire here regardless of its contents.
    async fn insert_new(
        &self,
        list_id: &str,
        owner_name: &str,
        kind: ListKind,
    ) -> Result<EnsureOutcome> {
        let fetched = self.fetcher.fetch_list(list_id).await?;
        let list = CardList::from_fetched(list_id, owner_name, fetched.cards, Utc::now());
        self.store.insert(kind, &list).await?;
        log::info!(
            "cached new {kind} '{list_id}' for {} ({} cards)",
            list.owner_name,
            list.cards.len()
        );
        Ok(EnsureOutcome::Inserted)
    }

    /// Update path for an existing entry, forced or stale-triggered.
    ///
    /// The sequence is load-old -> fetch-new -> diff -> notify ->
    /// persist-new and must not be reordered: persisting before the diff
    /// would destroy the old side and silently disable notifications. A
    /// persist failure after notifications went out is accepted
    /// (at-least-once delivery with a still-stale cache).
    pub async fn refresh(&self, current: CardList, kind: ListKind) -> Result<EnsureOutcome> {
        // The stored document is the old snapshot; its owner name wins over
        // anything the caller supplied, since the list may have been
        // re-associated since it was first cached.
        let list_id = current.list_id.clone();

        // Fetch-new. On failure the stale cache stays intact.
        let fetched = self.fetcher.fetch_list(&list_id).await?;

        // Diff + notify, tradelists only. Wishlists are never diffed.
        if kind == ListKind::Tradelist {
            let added = diff::newly_added(&current.cards, &fetched.cards);
            if added.is_empty() {
                log::debug!("no new cards on tradelist '{list_id}'");
            } else {
                log::info!(
                    "{} new card(s) on {}'s tradelist '{list_id}'",
                    added.len(),
                    current.owner_name
                );
                self.notify_subscribers(&current, &added).await;
            }
        }

        // Persist-new, the final step.
        let matched = self
            .store
            .update_cards(&list_id, kind, &fetched.cards, Utc::now())
            .await?;
        if !matched {
            return Err(Error::store_write_failed(format!(
                "{kind} '{list_id}' vanished during refresh"
            )));
        }
        Ok(EnsureOutcome::Refreshed)
    }

    /// Fan out notifications for newly-added cards to every subscriber
    /// whose own wishlist wants one of them.
    ///
    /// Best-effort throughout: resolution and delivery failures are logged
    /// and never abort the refresh.
    async fn notify_subscribers(&self, list: &CardList, added: &BTreeMap<String, u32>) {
        let subscribers = match self.store.subscribers(&list.owner_name).await {
            Ok(users) => users,
            Err(e) => {
                log::warn!(
                    "could not resolve subscribers of {}: {e}",
                    list.owner_name
                );
                return;
            }
        };

        for user in subscribers {
            let Some(deckbox_name) = user.deckbox_name.as_deref() else {
                continue;
            };
            let wishlist = match self
                .store
                .find_by_owner(deckbox_name, ListKind::Wishlist)
                .await
            {
                Ok(Some(wishlist)) => wishlist,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("could not load wishlist of {deckbox_name}: {e}");
                    continue;
                }
            };

            let hits = diff::wishlist_hits(added, &wishlist.cards);
            if hits.is_empty() || user.chat_id.is_none() {
                continue;
            }

            let event = NotificationEvent {
                owner_name: list.owner_name.clone(),
                list_id: list.list_id.clone(),
                cards: hits,
            };
            if let Err(e) = self.notifier.notify(&user, &event).await {
                log::warn!("notification to {} failed: {e}", user.telegram);
            }
        }
    }
}
