//! Wires the engine together from configuration: Mongo store, deckbox
//! fetcher, log notifier, synchronizer and sweep.

use crate::config::AppConfig;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use deckbox_sync_core::fetch::{DeckboxConfig, DeckboxFetcher};
use deckbox_sync_core::notify::LogNotifier;
use deckbox_sync_core::store::mongo::MongoStore;
use deckbox_sync_core::{
    CacheSynchronizer, EnsureOutcome, ListKind, ListStore, RecacheSweep,
};
use std::sync::Arc;

pub struct SyncOrchestrator {
    store: Arc<MongoStore>,
    synchronizer: Arc<CacheSynchronizer>,
}

impl SyncOrchestrator {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        if config.deckbox.login.is_empty() {
            bail!("no deckbox credentials configured; set [deckbox] login/password");
        }

        let store = Arc::new(
            MongoStore::connect(&config.mongo.url, &config.mongo.database)
                .await
                .context("failed to connect to MongoDB")?,
        );

        let deckbox = DeckboxConfig {
            base_url: config.deckbox.base_url.clone(),
            login: config.deckbox.login.clone(),
            password: config.deckbox.password.clone(),
        };
        let fetcher = Arc::new(
            DeckboxFetcher::new(deckbox, config.sync.session_max_age_minutes)
                .context("failed to build deckbox fetcher")?,
        );

        let synchronizer = Arc::new(CacheSynchronizer::new(
            store.clone(),
            fetcher,
            Arc::new(LogNotifier),
            &config.sync,
        ));

        Ok(Self {
            store,
            synchronizer,
        })
    }

    /// `ensure` command: cache a list if missing or stale.
    pub async fn ensure(&self, list_id: &str, owner: &str, kind: ListKind) -> Result<()> {
        let outcome = self
            .synchronizer
            .ensure_cached(list_id, owner, kind)
            .await
            .with_context(|| format!("failed to cache {kind} '{list_id}'"))?;

        match outcome {
            EnsureOutcome::Inserted => {
                println!("{} cached new {kind} '{list_id}'", "✓".green());
            }
            EnsureOutcome::Refreshed => {
                println!("{} refreshed stale {kind} '{list_id}'", "✓".green());
            }
            EnsureOutcome::AlreadyFresh => {
                println!("{kind} '{list_id}' is already fresh");
            }
        }
        Ok(())
    }

    /// `fresh` command: report freshness without touching the remote source.
    pub async fn fresh(&self, list_id: &str, kind: ListKind) -> Result<()> {
        let entry = self
            .store
            .get(list_id, kind)
            .await
            .with_context(|| format!("failed to look up {kind} '{list_id}'"))?;

        match entry {
            None => println!("{kind} '{list_id}' is {}", "not cached".yellow()),
            Some(list) => {
                let state = if self.synchronizer.freshness().is_fresh(Some(&list)) {
                    "fresh".green()
                } else {
                    "stale".yellow()
                };
                match list.last_cached_at {
                    Some(at) => println!(
                        "{kind} '{list_id}' is {state} (last cached {})",
                        at.to_rfc3339()
                    ),
                    None => println!("{kind} '{list_id}' is {state} (never cached)"),
                }
            }
        }
        Ok(())
    }

    /// `recache` command: force-refresh every stored list of a kind.
    pub async fn recache(&self, kind: ListKind) -> Result<()> {
        let sweep = RecacheSweep::new(self.synchronizer.clone());
        let report = sweep
            .recache_all(kind)
            .await
            .with_context(|| format!("{kind} sweep failed"))?;

        println!(
            "{} {kind} sweep: {} processed, {} refreshed, {} failed",
            if report.failed == 0 {
                "✓".green()
            } else {
                "!".yellow()
            },
            report.processed,
            report.refreshed,
            report.failed
        );
        if report.failed > 0 {
            bail!("{} list(s) failed to refresh", report.failed);
        }
        Ok(())
    }
}
