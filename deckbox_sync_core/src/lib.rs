//! Deckbox Sync Core Library
//!
//! This is the core library for the deckbox synchronization engine, providing
//! cache freshness evaluation, list synchronization, diff-based wishlist
//! notifications and the batch recache sweep.

pub mod config;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod freshness;
pub mod model;
pub mod notify;
pub mod recache;
pub mod store;
pub mod sync;

// Re-export main types
pub use config::{
    SyncConfig, DEFAULT_SESSION_MAX_AGE_MINUTES, DEFAULT_STALENESS_THRESHOLD_MINUTES,
};
pub use error::{Error, Result};
pub use fetch::{FetchedList, RemoteListFetcher};
pub use freshness::FreshnessEvaluator;
pub use model::{CardList, ListKind, User};
pub use notify::{NotificationEvent, Notifier};
pub use recache::{RecacheSweep, SweepReport};
pub use store::ListStore;
pub use sync::{CacheSynchronizer, EnsureOutcome};
