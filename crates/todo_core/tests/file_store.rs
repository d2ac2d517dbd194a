//! File-backed store tests.

use todo_codec::{Format, Item};
use todo_core::{CoreError, ItemStore, StoreConfig};
use todo_testkit::prelude::*;

#[test]
fn json_file_roundtrip() {
    let mut temp = TempStore::new(Format::Json);
    for item in sample_items() {
        temp.add(item);
    }
    temp.save().unwrap();

    let mut reopened = temp.reopen();
    assert_eq!(reopened.load().unwrap(), 3);
    assert_eq!(reopened.items_by_creation(), temp.items_by_creation());
}

#[test]
fn csv_file_roundtrip() {
    let mut temp = TempStore::new(Format::Csv);
    for item in sample_items() {
        temp.add(item);
    }
    temp.save().unwrap();

    let contents = std::fs::read_to_string(temp.path()).unwrap();
    assert!(contents.starts_with("id, text, importance"));

    let mut reopened = temp.reopen();
    reopened.load().unwrap();
    assert_eq!(reopened.items_by_creation(), temp.items_by_creation());
}

#[test]
fn missing_file_is_an_io_error() {
    let mut temp = TempStore::new(Format::Json);
    let err = temp.load().unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, CoreError::Storage(_)));
    assert!(!temp.load_if_present().unwrap());
}

#[test]
fn save_replaces_previous_snapshot() {
    let mut temp = TempStore::new(Format::Json);
    temp.add(Item::new("a", "first", ts(1_000)));
    temp.save().unwrap();

    temp.remove("a");
    temp.add(Item::new("b", "second", ts(2_000)));
    temp.save().unwrap();

    let mut reopened = temp.reopen();
    reopened.load().unwrap();
    assert!(!reopened.contains("a"));
    assert!(reopened.contains("b"));
}

#[test]
fn open_file_creates_directories_and_picks_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new()
        .directory(dir.path().join("nested").join("deeper"))
        .file_name("items.csv");

    let mut store = ItemStore::open_file(&config).unwrap();
    assert_eq!(*store.codec(), Format::Csv);

    store.add(Item::new("x", "text, with comma", ts(5_000)));
    store.save().unwrap();
    assert!(config.path().exists());
}

#[test]
fn import_replaces_after_clear() {
    let mut source = TempStore::new(Format::Csv);
    source.add(Item::new("imported", "from csv", ts(1_000)));
    source.save().unwrap();

    let mut target = TempStore::new(Format::Json);
    target.add(Item::new("stale", "old", ts(500)));

    let mut importer = source.reopen();
    importer.load().unwrap();
    target.clear();
    for item in importer.items_by_creation() {
        target.add(item);
    }

    assert_eq!(target.len(), 1);
    assert!(target.contains("imported"));
}
