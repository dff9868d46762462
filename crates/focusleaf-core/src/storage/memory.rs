use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::KvStore;
use crate::error::StorageError;

/// In-process key-value storage.
///
/// Writes can be switched to fail, which is how callers exercise the
/// storage-failure path without a real disk.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing the failure switch.
    pub fn with_value(key: &str, value: &str) -> Self {
        let kv = Self::new();
        kv.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        kv
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("write to '{key}' rejected")));
        }
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_writes_leave_value_untouched() {
        let kv = MemoryKv::with_value("k", "old");
        kv.set_fail_writes(true);
        assert!(kv.set("k", "new").is_err());
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("old"));

        kv.set_fail_writes(false);
        kv.set("k", "new").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("new"));
    }
}
