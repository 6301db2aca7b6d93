//! Remote list fetching
//!
//! `RemoteListFetcher` is the seam the synchronizer pulls card lists
//! through. The production implementation (`DeckboxFetcher`) authenticates
//! against deckbox.org via a `SessionManager` and parses the CSV export;
//! tests substitute a scripted mock.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub mod deckbox;
pub mod session;

pub use deckbox::{DeckboxAuthenticator, DeckboxConfig, DeckboxFetcher};
pub use session::{Authenticator, SessionManager, SessionToken};

/// A successfully fetched list snapshot.
///
/// `cards` is already lowercase-normalized with duplicate rows summed. An
/// empty map is a valid result: a list with zero cards is not an error.
#[derive(Debug, Clone, Default)]
pub struct FetchedList {
    pub cards: HashMap<String, u32>,
}

/// Seam to the remote list source.
#[async_trait]
pub trait RemoteListFetcher: Send + Sync {
    /// Fetch the current card set of a remote list.
    ///
    /// Fails with `RemoteUnavailable` when the source cannot be reached or
    /// authenticated, and `RemoteListNotFound` when the id does not exist
    /// remotely.
    async fn fetch_list(&self, list_id: &str) -> Result<FetchedList>;
}
