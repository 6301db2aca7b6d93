//! Mock implementations of the engine's trait seams

pub mod fetcher;
pub mod notifier;
pub mod store;

pub use fetcher::MockFetcher;
pub use notifier::RecordingNotifier;
pub use store::FlakyStore;
