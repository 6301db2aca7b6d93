//! Notification events and delivery seam
//!
//! Delivery is fire-and-forget: the synchronizer computes events and hands
//! them to a `Notifier`; a failed delivery never aborts the refresh/persist
//! sequence.

use crate::error::Result;
use crate::model::User;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One notification to one subscriber: wanted cards that just appeared on a
/// watched tradelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Owner of the tradelist the cards appeared on.
    pub owner_name: String,
    /// Remote id of that tradelist, for building a deep link.
    pub list_id: String,
    /// Matched card name -> quantity now available.
    pub cards: BTreeMap<String, u32>,
}

/// Delivery seam to the messaging subsystem.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event to one user.
    ///
    /// Implementations report failures via `Err`, but callers treat delivery
    /// as best-effort and only log them.
    async fn notify(&self, user: &User, event: &NotificationEvent) -> Result<()>;
}

/// Notifier that writes events to the log instead of delivering them.
///
/// Used by the CLI, where the queue-based delivery subsystem is not wired
/// in, and handy as a default in local runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user: &User, event: &NotificationEvent) -> Result<()> {
        log::info!(
            "notify {}: {} new wanted card(s) on {}'s tradelist ({})",
            user.telegram,
            event.cards.len(),
            event.owner_name,
            event.list_id,
        );
        Ok(())
    }
}
