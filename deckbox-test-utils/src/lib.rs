//! Test utilities for the deckbox sync engine
//!
//! This crate provides mock implementations and test builders for testing
//! the cache synchronization engine without a database or network.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{card_list, user, UserBuilder};
pub use mocks::{FlakyStore, MockFetcher, RecordingNotifier};
