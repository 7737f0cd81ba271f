#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use junaikey_core::storage::StorageResult;
use junaikey_core::{MemoryStorage, StorageError, StoragePort};
use std::collections::HashSet;
use std::sync::Mutex;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

/// Memory storage whose writes can be made to fail per namespace.
#[derive(Default)]
pub struct FaultyStorage {
    inner: MemoryStorage,
    failing: Mutex<HashSet<String>>,
}

impl FaultyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, namespace: &str) {
        self.failing.lock().unwrap().insert(namespace.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn check(&self, key: &str) -> StorageResult<()> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(StorageError::Unavailable(format!("write to {key} rejected")));
        }
        Ok(())
    }
}

impl StoragePort for FaultyStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check(key)?;
        self.inner.remove(key)
    }
}
