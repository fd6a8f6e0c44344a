#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use quanto_custa::{
    config::ConfigManager,
    core::{time::ManualClock, LedgerStore},
    storage::{JsonStorage, MemoryStorage},
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

/// A fresh directory that outlives the test body.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Store backed by JSON files in an isolated directory, driven by a manual clock.
pub fn setup_file_store() -> (LedgerStore, ManualClock, PathBuf) {
    let base = temp_base();
    let clock = ManualClock::new(start_time());
    let storage = JsonStorage::new(Some(base.clone())).expect("create json storage backend");
    let store = LedgerStore::open(Box::new(storage), Arc::new(clock.clone()));
    (store, clock, base)
}

/// Reopens whatever a previous store left in `base`.
pub fn reopen(base: &PathBuf, clock: &ManualClock) -> LedgerStore {
    let storage = JsonStorage::new(Some(base.clone())).expect("create json storage backend");
    LedgerStore::open(Box::new(storage), Arc::new(clock.clone()))
}

/// In-memory store; the returned handle observes (and can break) its saves.
pub fn setup_memory_store() -> (LedgerStore, MemoryStorage, ManualClock) {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(start_time());
    let store = LedgerStore::open(Box::new(storage.clone()), Arc::new(clock.clone()));
    (store, storage, clock)
}

pub fn setup_config_manager() -> ConfigManager {
    ConfigManager::with_base_dir(temp_base()).expect("create config manager for temp dir")
}
