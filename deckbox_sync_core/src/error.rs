//! Error types for the deckbox sync engine
//!
//! Fetch and store failures are ordinary result values that callers of
//! `ensure_cached`/`recache_all` inspect; they never abort a batch sweep.
//! Notification delivery failures are deliberately not represented here:
//! delivery is best-effort and failures are logged where they happen.

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the deckbox sync engine
#[derive(Error, Debug)]
pub enum Error {
    /// The remote source could not be reached or authenticated.
    ///
    /// Recoverable by re-issuing the whole operation later; an existing
    /// cache entry is never overwritten on this path.
    #[error("remote source unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    /// The list identifier does not exist on the remote source.
    ///
    /// Distinct from a list with zero cards, which is a valid fetch result.
    #[error("remote list '{list_id}' does not exist")]
    RemoteListNotFound { list_id: String },

    /// Persistence failed after a successful fetch; the stale stored copy
    /// remains intact and the refreshed snapshot is lost for this call.
    #[error("store write failed: {reason}")]
    StoreWriteFailed { reason: String },

    /// A store read or enumeration failed.
    #[error("store error: {reason}")]
    Store { reason: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl Error {
    pub fn remote_unavailable(reason: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            reason: reason.into(),
        }
    }

    pub fn remote_list_not_found(list_id: impl Into<String>) -> Self {
        Self::RemoteListNotFound {
            list_id: list_id.into(),
        }
    }

    pub fn store_write_failed(reason: impl Into<String>) -> Self {
        Self::StoreWriteFailed {
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether re-issuing the same call later can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable { .. } | Self::StoreWriteFailed { .. } | Self::Store { .. }
        )
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Self::store(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::remote_unavailable(err.to_string())
    }
}
