//! End-to-end tests of the sync engine over file-backed stores.

use std::sync::Arc;
use tempfile::TempDir;
use todo_codec::{Format, Item};
use todo_core::{ItemStore, StoreConfig};
use todo_storage::FileBackend;
use todo_sync_engine::{MockRemote, RetryConfig, SyncConfig, SyncEngine, SyncError, SyncState};
use todo_testkit::prelude::*;

type FileEngine = SyncEngine<FileBackend, Format, MockRemote>;

fn open(dir: &TempDir, file_name: &str, remote: &Arc<MockRemote>, device: &str) -> FileEngine {
    let store = ItemStore::open_file(
        &StoreConfig::new()
            .directory(dir.path())
            .file_name(file_name),
    )
    .unwrap();
    let config = SyncConfig::new("mock://", "token")
        .with_device_id(device)
        .with_retry(RetryConfig::no_retry());
    SyncEngine::with_shared_remote(config, store, Arc::clone(remote)).unwrap()
}

fn texts(items: &[Item]) -> Vec<&str> {
    let mut texts: Vec<&str> = items.iter().map(Item::text).collect();
    texts.sort_unstable();
    texts
}

#[tokio::test(start_paused = true)]
async fn offline_edits_survive_restart_and_sync_later() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemote::new());
    remote.set_offline(true);

    let mut engine = open(&dir, "items.json", &remote, "phone");
    engine.add_item("buy milk").unwrap();
    engine.add_item("call mom").unwrap();
    let outcomes = engine.wait_for_replication().await;
    assert!(outcomes.iter().all(|o| o.result.is_err()));

    let err = engine.begin_sync().await.unwrap_err();
    assert!(matches!(err, SyncError::RetryExhausted { .. }));
    assert_eq!(engine.state(), SyncState::Failed);
    drop(engine);

    remote.set_offline(false);
    let mut engine = open(&dir, "items.json", &remote, "phone");
    let result = engine.begin_sync().await.unwrap();
    assert_eq!(result.pushed, 2);
    assert_eq!(texts(&engine.current_items()), ["buy milk", "call mom"]);
    assert_eq!(remote.items().len(), 2);
    assert!(remote.items().iter().all(|i| i.last_updated_by == "phone"));
}

#[tokio::test]
async fn remote_items_land_in_csv_file() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemote::with_items(&sample_items(), "web"));

    let mut engine = open(&dir, "items.csv", &remote, "laptop");
    let result = engine.begin_sync().await.unwrap();
    assert_eq!(result.pulled, 3);

    let contents = std::fs::read_to_string(dir.path().join("items.csv")).unwrap();
    assert!(contents.starts_with("id, text, importance, deadline"));
    assert_eq!(contents.lines().count(), 4);

    let mut reopened = ItemStore::open_file(
        &StoreConfig::new().directory(dir.path()).file_name("items.csv"),
    )
    .unwrap();
    reopened.load().unwrap();
    assert_eq!(reopened.items_by_creation(), engine.current_items());
}

#[tokio::test(start_paused = true)]
async fn two_clients_converge() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemote::new());
    let mut alice = open(&dir, "alice.json", &remote, "alice");
    let mut bob = open(&dir, "bob.json", &remote, "bob");

    alice.add_item("from alice").unwrap();
    assert!(alice.wait_for_replication().await[0].result.is_ok());
    alice.begin_sync().await.unwrap();

    // Bob has never seen a revision, so his single-item write is rejected
    // until a full sync brings him up to date.
    bob.add_item("from bob").unwrap();
    let outcome = bob.wait_for_replication().await.remove(0);
    assert_eq!(outcome.result.unwrap_err().status(), Some(400));

    bob.begin_sync().await.unwrap();
    alice.begin_sync().await.unwrap();

    assert_eq!(texts(&alice.current_items()), ["from alice", "from bob"]);
    assert_eq!(texts(&bob.current_items()), ["from alice", "from bob"]);
    assert_eq!(alice.revision(), remote.revision());
}

#[tokio::test]
async fn local_edit_beats_remote_copy_after_restart() {
    let dir = TempDir::new().unwrap();
    let original = Item::new("shared", "original", ts(1_000));
    let remote = Arc::new(MockRemote::with_items(&[original.clone()], "web"));

    let mut engine = open(&dir, "items.json", &remote, "phone");
    engine.begin_sync().await.unwrap();
    engine.edit_item(original.with_text("edited offline")).unwrap();
    engine.cancel_replication();
    drop(engine);

    let mut engine = open(&dir, "items.json", &remote, "phone");
    let result = engine.begin_sync().await.unwrap();
    assert_eq!(result.kept_local, 1);
    assert_eq!(engine.get("shared").unwrap().text(), "edited offline");
    assert_eq!(remote.item("shared").unwrap().text, "edited offline");
}
