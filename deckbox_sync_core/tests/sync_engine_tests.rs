//! End-to-end tests for the cache synchronizer and recache sweep, driven
//! through the in-memory store and scripted mocks.

use deckbox_sync_core::{
    CacheSynchronizer, EnsureOutcome, Error, ListKind, ListStore, RecacheSweep, SyncConfig,
};
use deckbox_sync_core::store::memory::MemoryStore;
use deckbox_test_utils::{card_list, user, FlakyStore, MockFetcher, RecordingNotifier};
use std::sync::Arc;

struct Harness {
    store: Arc<MemoryStore>,
    fetcher: Arc<MockFetcher>,
    notifier: Arc<RecordingNotifier>,
    sync: Arc<CacheSynchronizer>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(MockFetcher::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let sync = Arc::new(CacheSynchronizer::new(
        store.clone(),
        fetcher.clone(),
        notifier.clone(),
        &SyncConfig::default(),
    ));
    Harness {
        store,
        fetcher,
        notifier,
        sync,
    }
}

#[tokio::test]
async fn test_miss_inserts_without_notifying() {
    let h = harness();
    h.store
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("watcherbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w1", "watcherbox", &[("Sol Ring", 1)], Some(0)),
        )
        .await
        .unwrap();
    h.fetcher
        .expect_cards("t1", &[("Sol Ring", 2), ("Ponder", 4)]);

    let outcome = h
        .sync
        .ensure_cached("t1", "Alice", ListKind::Tradelist)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::Inserted);
    assert_eq!(h.fetcher.fetch_count(), 1);
    // First cache has no prior snapshot to diff against, even though the
    // watcher's wishlist wants a card that is on the new list.
    assert!(h.notifier.events().is_empty());

    let stored = h
        .store
        .get("t1", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.owner_name, "alice");
    assert_eq!(stored.cards.get("sol ring"), Some(&2));
    assert!(stored.last_cached_at.is_some());
}

#[tokio::test]
async fn test_fresh_hit_is_a_no_op() {
    let h = harness();
    h.fetcher.expect_cards("t1", &[("Ponder", 4)]);

    let first = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();
    let second = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    assert_eq!(first, EnsureOutcome::Inserted);
    assert_eq!(second, EnsureOutcome::AlreadyFresh);
    // The second call must not go back to the remote source.
    assert_eq!(h.fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_stale_entry_is_refreshed() {
    let h = harness();
    // Seed an entry cached just past the default threshold.
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[("Ponder", 4)], Some(1500)),
        )
        .await
        .unwrap();
    h.fetcher.expect_cards("t1", &[("Ponder", 4), ("Brainstorm", 1)]);

    let outcome = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::Refreshed);
    assert_eq!(h.fetcher.fetch_count(), 1);
    let stored = h
        .store
        .get("t1", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.cards.len(), 2);
}

#[tokio::test]
async fn test_never_cached_entry_counts_as_stale() {
    let h = harness();
    h.store
        .insert(ListKind::Tradelist, &card_list("t1", "alice", &[], None))
        .await
        .unwrap();
    h.fetcher.expect_cards("t1", &[("Ponder", 4)]);

    let outcome = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();
    assert_eq!(outcome, EnsureOutcome::Refreshed);
}

#[tokio::test]
async fn test_subscriber_notified_only_for_wishlist_hits() {
    let h = harness();
    h.store
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("watcherbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list(
                "w1",
                "watcherbox",
                &[("Brainstorm", 4), ("Lotus", 1)],
                Some(0),
            ),
        )
        .await
        .unwrap();
    // Old tradelist snapshot, stale.
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[("Ponder", 4)], Some(2000)),
        )
        .await
        .unwrap();
    // New snapshot adds two names; only one is on the wishlist.
    h.fetcher.expect_cards(
        "t1",
        &[("Ponder", 4), ("Brainstorm", 2), ("Counterspell", 3)],
    );

    h.sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    let events = h.notifier.events_for("watcher");
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.owner_name, "alice");
    assert_eq!(event.list_id, "t1");
    assert_eq!(event.cards.len(), 1);
    // The quantity reported is the tradelist's, not the wishlist's.
    assert_eq!(event.cards.get("brainstorm"), Some(&2));
}

#[tokio::test]
async fn test_quantity_change_alone_does_not_notify() {
    let h = harness();
    h.store
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("watcherbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w1", "watcherbox", &[("Ponder", 4)], Some(0)),
        )
        .await
        .unwrap();
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[("Ponder", 1)], Some(2000)),
        )
        .await
        .unwrap();
    // Same name, higher count: not a newly-added card.
    h.fetcher.expect_cards("t1", &[("Ponder", 4)]);

    h.sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_matching_is_case_insensitive() {
    let h = harness();
    h.store
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("WatcherBox")
                .subscribed_to("ALICE")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w1", "watcherbox", &[("SOL RING", 1)], Some(0)),
        )
        .await
        .unwrap();
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "Alice", &[], Some(2000)),
        )
        .await
        .unwrap();
    h.fetcher.expect_cards("t1", &[("Sol Ring", 3)]);

    h.sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    let events = h.notifier.events_for("watcher");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].cards.get("sol ring"), Some(&3));
}

#[tokio::test]
async fn test_subscriber_without_chat_id_or_wishlist_is_skipped() {
    let h = harness();
    // Subscribed but never opened a chat.
    h.store
        .add_user(
            user("silent")
                .with_deckbox_name("silentbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w1", "silentbox", &[("Sol Ring", 1)], Some(0)),
        )
        .await
        .unwrap();
    // Subscribed but has no deckbox account of their own.
    h.store
        .add_user(user("nameless").with_chat_id("7").subscribed_to("alice").build())
        .await;
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[], Some(2000)),
        )
        .await
        .unwrap();
    h.fetcher.expect_cards("t1", &[("Sol Ring", 1)]);

    let outcome = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::Refreshed);
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_wishlist_refresh_never_notifies() {
    let h = harness();
    h.store
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("watcherbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w-watcher", "watcherbox", &[("Sol Ring", 1)], Some(0)),
        )
        .await
        .unwrap();
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w-alice", "alice", &[], Some(2000)),
        )
        .await
        .unwrap();
    h.fetcher.expect_cards("w-alice", &[("Sol Ring", 1)]);

    let outcome = h
        .sync
        .ensure_cached("w-alice", "alice", ListKind::Wishlist)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::Refreshed);
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_preserves_old_cache() {
    let h = harness();
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[("Ponder", 4)], Some(2000)),
        )
        .await
        .unwrap();
    h.fetcher.expect_unavailable("t1");

    let err = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RemoteUnavailable { .. }));

    // The stale snapshot survives untouched.
    let stored = h
        .store
        .get("t1", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.cards.get("ponder"), Some(&4));
    assert!(!h.sync.freshness().is_fresh(Some(&stored)));
}

#[tokio::test]
async fn test_unknown_remote_list_surfaces_not_found() {
    let h = harness();
    h.fetcher.expect_not_found("missing");

    let err = h
        .sync
        .ensure_cached("missing", "alice", ListKind::Tradelist)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RemoteListNotFound { .. }));
    assert_eq!(h.store.count(ListKind::Tradelist).await, 0);
}

#[tokio::test]
async fn test_delivery_failure_does_not_abort_refresh() {
    let h = harness();
    for (telegram, deckbox) in [("flaky", "flakybox"), ("steady", "steadybox")] {
        h.store
            .add_user(
                user(telegram)
                    .with_chat_id("1")
                    .with_deckbox_name(deckbox)
                    .subscribed_to("alice")
                    .build(),
            )
            .await;
        h.store
            .insert(
                ListKind::Wishlist,
                &card_list(
                    &format!("w-{deckbox}"),
                    deckbox,
                    &[("Sol Ring", 1)],
                    Some(0),
                ),
            )
            .await
            .unwrap();
    }
    h.notifier.fail_for("flaky");
    h.store
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[], Some(2000)),
        )
        .await
        .unwrap();
    h.fetcher.expect_cards("t1", &[("Sol Ring", 1)]);

    let outcome = h
        .sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::Refreshed);
    assert!(h.notifier.events_for("flaky").is_empty());
    assert_eq!(h.notifier.events_for("steady").len(), 1);
    // Persisted despite the delivery failure.
    let stored = h
        .store
        .get("t1", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.cards.len(), 1);
}

#[tokio::test]
async fn test_persist_failure_surfaces_after_notifications() {
    let inner = Arc::new(MemoryStore::new());
    inner
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("watcherbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    inner
        .insert(
            ListKind::Wishlist,
            &card_list("w1", "watcherbox", &[("Sol Ring", 1)], Some(0)),
        )
        .await
        .unwrap();
    inner
        .insert(
            ListKind::Tradelist,
            &card_list("t1", "alice", &[], Some(2000)),
        )
        .await
        .unwrap();

    let store = Arc::new(FlakyStore::new(inner.clone()));
    let fetcher = Arc::new(MockFetcher::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let sync = CacheSynchronizer::new(
        store.clone(),
        fetcher.clone(),
        notifier.clone(),
        &SyncConfig::default(),
    );
    fetcher.expect_cards("t1", &[("Sol Ring", 1)]);
    store.set_fail_writes(true);

    let err = sync
        .ensure_cached("t1", "alice", ListKind::Tradelist)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StoreWriteFailed { .. }));

    // Notifications went out before the persist attempt; the old snapshot
    // is still in place.
    assert_eq!(notifier.events_for("watcher").len(), 1);
    let stored = inner
        .get("t1", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.cards.is_empty());
}

#[tokio::test]
async fn test_sweep_refreshes_all_and_tolerates_failures() {
    let h = harness();
    for i in 1..=5 {
        let id = format!("t{i}");
        h.store
            .insert(
                ListKind::Tradelist,
                // Fresh entries too: the sweep must not consult freshness.
                &card_list(&id, &format!("owner{i}"), &[("Ponder", 4)], Some(0)),
            )
            .await
            .unwrap();
        if i == 2 {
            h.fetcher.expect_unavailable(&id);
        } else {
            h.fetcher.expect_cards(&id, &[("Ponder", 4), ("Brainstorm", 1)]);
        }
    }

    let sweep = RecacheSweep::new(h.sync.clone());
    let report = sweep.recache_all(ListKind::Tradelist).await.unwrap();

    assert_eq!(report.processed, 5);
    assert_eq!(report.refreshed, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(h.fetcher.fetch_count(), 5);

    // The failed list keeps its old snapshot; the rest got the new one.
    let failed = h
        .store
        .get("t2", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.cards.len(), 1);
    let refreshed = h
        .store
        .get("t3", ListKind::Tradelist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.cards.len(), 2);
}

#[tokio::test]
async fn test_wishlist_sweep_never_notifies() {
    let h = harness();
    h.store
        .add_user(
            user("watcher")
                .with_chat_id("42")
                .with_deckbox_name("watcherbox")
                .subscribed_to("alice")
                .build(),
        )
        .await;
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w-watcher", "watcherbox", &[("Sol Ring", 1)], Some(0)),
        )
        .await
        .unwrap();
    h.store
        .insert(
            ListKind::Wishlist,
            &card_list("w-alice", "alice", &[], Some(0)),
        )
        .await
        .unwrap();
    h.fetcher.expect_cards("w-watcher", &[("Sol Ring", 1)]);
    h.fetcher.expect_cards("w-alice", &[("Sol Ring", 9)]);

    let sweep = RecacheSweep::new(h.sync.clone());
    let report = sweep.recache_all(ListKind::Wishlist).await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.refreshed, 2);
    assert!(h.notifier.events().is_empty());
}
