//! Read-tracking access to environment variables.
//!
//! Responsibilities:
//! - Wrap the process environment, or a caller-supplied map, behind one interface.
//! - Remember every key that has been read.
//! - Refuse writes and deletes to keys that have already been read.
//! - Refuse names and values the platform environment cannot hold.
//!
//! Does NOT handle:
//! - Resolving configuration (see `loader`), which only ever reads.
//!
//! Invariants:
//! - The process-wide guard is created on first use and never reset, so its
//!   read set accumulates across every caller that uses it.
//! - Callers needing isolation construct their own guard with `from_map`.
//! - Non-UTF-8 process values read as absent.
//! - The read set only covers reads made through this guard. Writes to the
//!   process store are meant for single-threaded setup, before other threads
//!   or foreign code read the environment.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use crate::error::EnvironmentError;

enum Store {
    Process,
    Map(Mutex<HashMap<String, String>>),
}

/// Environment accessor that tracks reads.
pub struct EnvironmentGuard {
    store: Store,
    read: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate_key(key: &str) -> Result<(), EnvironmentError> {
    if key.is_empty() || key.contains(['=', '\0']) {
        return Err(EnvironmentError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl EnvironmentGuard {
    /// The process-wide guard over `std::env`.
    pub fn process() -> &'static EnvironmentGuard {
        static PROCESS: OnceLock<EnvironmentGuard> = OnceLock::new();
        PROCESS.get_or_init(|| EnvironmentGuard {
            store: Store::Process,
            read: Mutex::new(HashSet::new()),
        })
    }

    /// A private guard over an in-memory map.
    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            store: Store::Map(Mutex::new(map)),
            read: Mutex::new(HashSet::new()),
        }
    }

    /// Read `key`, marking it as read.
    pub fn get(&self, key: &str) -> Option<String> {
        lock(&self.read).insert(key.to_string());
        match &self.store {
            Store::Process => std::env::var(key).ok(),
            Store::Map(map) => lock(map).get(key).cloned(),
        }
    }

    /// True if `key` is set. Does not mark the key as read.
    pub fn has(&self, key: &str) -> bool {
        match &self.store {
            Store::Process => std::env::var(key).is_ok(),
            Store::Map(map) => lock(map).contains_key(key),
        }
    }

    pub fn was_read(&self, key: &str) -> bool {
        lock(&self.read).contains(key)
    }

    /// Set `key`, unless it has already been read.
    pub fn set(&self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        validate_key(key)?;
        if value.contains('\0') {
            return Err(EnvironmentError::InvalidValue(key.to_string()));
        }
        let read = lock(&self.read);
        if read.contains(key) {
            return Err(EnvironmentError::AlreadyRead(key.to_string()));
        }
        match &self.store {
            // SAFETY: key and value were validated above, so `set_var` cannot
            // panic. Nothing here stops another thread or foreign code from
            // reading the environment concurrently; process-backed writes are
            // only sound during single-threaded setup, as documented above.
            Store::Process => unsafe { std::env::set_var(key, value) },
            Store::Map(map) => {
                lock(map).insert(key.to_string(), value.to_string());
            }
        }
        debug!(key, "environment variable set");
        Ok(())
    }

    /// Remove `key`, unless it has already been read.
    pub fn delete(&self, key: &str) -> Result<(), EnvironmentError> {
        validate_key(key)?;
        let read = lock(&self.read);
        if read.contains(key) {
            return Err(EnvironmentError::DeleteAfterRead(key.to_string()));
        }
        match &self.store {
            // SAFETY: see `set`.
            Store::Process => unsafe { std::env::remove_var(key) },
            Store::Map(map) => {
                lock(map).remove(key);
            }
        }
        debug!(key, "environment variable removed");
        Ok(())
    }
}
