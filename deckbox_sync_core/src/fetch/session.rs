//! Remote session lifecycle
//!
//! The remote source hands out a session token on login. The token is
//! reused for up to a configured age and renewed transparently when it
//! expires or when an authenticated call reports it dead. One manager is
//! shared by all callers of a fetcher.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An opaque authenticated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Performs the actual login against the remote source.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self) -> Result<SessionToken>;
}

#[derive(Debug, Clone)]
struct SessionState {
    token: SessionToken,
    acquired_at: DateTime<Utc>,
}

/// Tracks one shared session token and its age.
///
/// Renewal is not serialized across the login await: two tasks observing an
/// expired token at the same time may both log in, and the later writer's
/// token stays cached. Both logins succeed independently, so the
/// duplication is benign.
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    max_age_minutes: i64,
    state: RwLock<Option<SessionState>>,
}

impl SessionManager {
    pub fn new(authenticator: Arc<dyn Authenticator>, max_age_minutes: i64) -> Self {
        Self {
            authenticator,
            max_age_minutes,
            state: RwLock::new(None),
        }
    }

    /// A valid session token, logging in first if the cached one is missing
    /// or older than the configured max age.
    pub async fn current(&self) -> Result<SessionToken> {
        let now = Utc::now();
        if let Some(state) = self.state.read().await.as_ref() {
            if self.is_current(state, now) {
                return Ok(state.token.clone());
            }
            log::debug!("remote session expired, re-authenticating");
        }

        let token = self.authenticator.login().await?;
        *self.state.write().await = Some(SessionState {
            token: token.clone(),
            acquired_at: now,
        });
        Ok(token)
    }

    /// Drop the cached token so the next `current` call re-authenticates.
    ///
    /// Called when an authenticated request indicates the session died
    /// before its nominal max age.
    pub async fn invalidate(&self) {
        *self.state.write().await = None;
    }

    fn is_current(&self, state: &SessionState, now: DateTime<Utc>) -> bool {
        (now - state.acquired_at).num_minutes() < self.max_age_minutes
    }
}
