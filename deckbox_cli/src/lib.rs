//! Library surface of the deckbox-sync CLI, exposed for integration tests.

pub mod config;
pub mod orchestrator;
