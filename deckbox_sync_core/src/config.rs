//! Engine configuration
//!
//! Two knobs: how long a cached list stays fresh, and how long an
//! authenticated remote session is reused before re-login.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Minutes a cached list counts as fresh.
///
/// 720 (12h) appears in older documentation of the source system but 1500
/// is the current policy; treat the shorter value as stale docs.
pub const DEFAULT_STALENESS_THRESHOLD_MINUTES: i64 = 1500;

/// Minutes an authenticated remote session is reused before renewal.
pub const DEFAULT_SESSION_MAX_AGE_MINUTES: i64 = 60;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Cache entries older than this many minutes are stale.
    pub staleness_threshold_minutes: i64,
    /// Remote session tokens older than this many minutes are renewed.
    pub session_max_age_minutes: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            staleness_threshold_minutes: DEFAULT_STALENESS_THRESHOLD_MINUTES,
            session_max_age_minutes: DEFAULT_SESSION_MAX_AGE_MINUTES,
        }
    }
}

impl SyncConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.staleness_threshold_minutes <= 0 {
            return Err(Error::config(
                "staleness_threshold_minutes must be positive",
            ));
        }
        if self.session_max_age_minutes <= 0 {
            return Err(Error::config("session_max_age_minutes must be positive"));
        }
        Ok(())
    }
}
