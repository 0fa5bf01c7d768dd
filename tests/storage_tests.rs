use std::fs;

use tempfile::TempDir;

use eztask::error::StoreError;
use eztask::models::{Task, FLAG_COLLISION_WARNING, FLAG_DAILY, RECORD_SIZE};
use eztask::storage::{store_path, valid_username, StoreKind, TaskStore};

fn store_in(dir: &TempDir, name: &str) -> TaskStore {
    TaskStore::new(dir.path().join(name))
}

fn sample(name: &str, start: i64) -> Task {
    Task::new(name, start, 30, 5)
}

#[test]
fn test_record_size() {
    assert_eq!(RECORD_SIZE, 78);
}

#[test]
fn test_append_then_count_and_read_back() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    let mut task = sample("Water the plants", 1_700_000_000);
    task.repeat_count = 7;
    task.set_flag(FLAG_DAILY);
    task.set_flag(FLAG_COLLISION_WARNING);

    store.append(&task).unwrap();
    assert_eq!(store.count().unwrap(), 1);

    let read = store.read_one(0).unwrap();
    assert_eq!(read, task);
}

#[test]
fn test_round_trip_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    let mut task = Task::new("Dentist", -12_345, u16::MAX, 200);
    task.repeat_count = u16::MAX;
    task.set_flag(FLAG_DAILY);

    store.append(&task).unwrap();
    let read = store.read_one(0).unwrap();
    assert_eq!(read.name, "Dentist");
    assert_eq!(read.start_time, -12_345);
    assert_eq!(read.duration_mins, u16::MAX);
    assert_eq!(read.repeat_count, u16::MAX);
    assert_eq!(read.importance, 200);
    assert_eq!(read.flags, task.flags);
}

#[test]
fn test_append_increments_count() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    for i in 0..3 {
        assert_eq!(store.count().unwrap_or(0), i);
        store.append(&sample(&format!("task {}", i), 1_700_000_000)).unwrap();
        assert_eq!(store.count().unwrap(), i + 1);
    }
}

#[test]
fn test_read_one_past_end() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    store.append(&sample("only", 1_700_000_000)).unwrap();

    match store.read_one(1) {
        Err(StoreError::IndexOutOfRange { index: 1, count: 1 }) => {}
        other => panic!("expected IndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_read_one_on_absent_store() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "nobody.dat");

    match store.read_one(0) {
        Err(StoreError::IndexOutOfRange { .. }) => {}
        other => panic!("expected IndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_count_on_absent_store() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "nobody.dat");

    match store.count() {
        Err(StoreError::StorageUnavailable(_)) => {}
        other => panic!("expected StorageUnavailable, got {:?}", other),
    }
}

#[test]
fn test_corrupt_store_detected() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "mangled.dat");
    fs::write(store.path(), vec![0u8; RECORD_SIZE + 1]).unwrap();

    match store.count() {
        Err(StoreError::CorruptStore { len }) => assert_eq!(len, (RECORD_SIZE + 1) as u64),
        other => panic!("expected CorruptStore, got {:?}", other),
    }
}

#[test]
fn test_delete_preserves_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    for name in ["a", "b", "c", "d"] {
        store.append(&sample(name, 1_700_000_000)).unwrap();
    }

    store.delete_at(1).unwrap();

    let names: Vec<String> = store
        .read_range(0, 10)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["a", "c", "d"]);
}

#[test]
fn test_delete_out_of_range_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    for name in ["a", "b"] {
        store.append(&sample(name, 1_700_000_000)).unwrap();
    }

    match store.delete_at(2) {
        Err(StoreError::IndexOutOfRange { index: 2, count: 2 }) => {}
        other => panic!("expected IndexOutOfRange, got {:?}", other),
    }
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_read_range_truncates_at_end() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    for name in ["a", "b", "c"] {
        store.append(&sample(name, 1_700_000_000)).unwrap();
    }

    assert_eq!(store.read_range(1, 10).unwrap().len(), 2);
    assert_eq!(store.read_range(0, 2).unwrap().len(), 2);
    assert!(store.read_range(3, 5).unwrap().is_empty());
    assert!(store.read_range(10, 5).unwrap().is_empty());
}

#[test]
fn test_long_name_is_truncated_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    store.append(&sample(&"x".repeat(100), 1_700_000_000)).unwrap();

    let read = store.read_one(0).unwrap();
    assert_eq!(read.name, "x".repeat(63));
}

#[test]
fn test_longest_fitting_name_survives() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    let name = "y".repeat(63);
    store.append(&sample(&name, 1_700_000_000)).unwrap();

    assert_eq!(store.read_one(0).unwrap().name, name);
}

#[test]
fn test_create_and_exists() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "fresh.dat");

    assert!(!store.exists());
    store.create().unwrap();
    assert!(store.exists());
    assert_eq!(store.count().unwrap(), 0);

    store.remove().unwrap();
    assert!(!store.exists());
}

#[test]
fn test_rewrite_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    store.append(&sample("a", 1_700_000_000)).unwrap();
    store.delete_at(0).unwrap();

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
}

#[test]
fn test_valid_username() {
    assert!(valid_username("alice"));
    assert!(valid_username("Bob-2_test"));
    assert!(valid_username("z"));

    assert!(!valid_username(""));
    assert!(!valid_username("1alice"));
    assert!(!valid_username("_alice"));
    assert!(!valid_username("al ice"));
    assert!(!valid_username("al.ice"));
}

#[test]
fn test_store_path_naming() {
    let dir = TempDir::new().unwrap();
    let primary = store_path(dir.path(), "alice", StoreKind::Primary);
    let day = store_path(dir.path(), "alice", StoreKind::Day);
    let week = store_path(dir.path(), "alice", StoreKind::Week);

    assert!(primary.ends_with("alice.dat"));
    assert!(day.ends_with("alice_day.dat"));
    assert!(week.ends_with("alice_week.dat"));
}
