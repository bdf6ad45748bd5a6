//! Session Cache Module
//!
//! A cache backend over an externally-owned, in-memory context. The caller
//! creates the context, decides how long it lives, and may hand clones of it
//! to any number of cache instances; nothing here assumes a process-wide
//! singleton. Entries vanish when the last clone of the context is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::cache::expiry;
use crate::cache::key::{validate_key, validate_prefix};
use crate::cache::Cache;
use crate::error::{CacheError, Result};

// == Session Entry ==
/// A stored value together with its expiry metadata.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    value: Vec<u8>,
    ttl_seconds: u64,
    created_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new(value: Vec<u8>, ttl_seconds: u64) -> Self {
        Self {
            value,
            ttl_seconds,
            created_at: Utc::now(),
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        expiry::is_live(self.ttl_seconds, self.created_at, now)
    }
}

// == Session Store ==
/// The caller-owned context a [`SessionCache`] reads and writes.
///
/// Create one with `SessionStore::default()` and clone it into every cache
/// instance that should share the session.
pub type SessionStore = Arc<RwLock<HashMap<String, SessionEntry>>>;

// == Session Cache ==
/// Cache backend bound to a caller-supplied session context.
///
/// Keys are addressed as the raw concatenation of prefix and key; no
/// normalization is applied because the backing map has no filesystem
/// constraints. Expiry follows the same lazy read-time rule as the
/// file-backed cache.
#[derive(Debug, Clone)]
pub struct SessionCache {
    store: SessionStore,
    prefix: Option<String>,
}

impl SessionCache {
    // == Constructor ==
    /// Binds a cache to a session context. No namespace is selected yet.
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            prefix: None,
        }
    }

    /// Binds a cache to a session context and selects a namespace in one
    /// step.
    pub fn with_prefix(store: SessionStore, prefix: &str) -> Result<Self> {
        let mut cache = Self::new(store);
        cache.set_prefix(prefix)?;
        Ok(cache)
    }

    // == Helpers ==
    fn active_prefix(&self) -> Result<&str> {
        self.prefix.as_deref().ok_or_else(|| {
            CacheError::Configuration(
                "no namespace selected; call set_prefix before using the cache".to_string(),
            )
        })
    }

    fn fq_key(&self, key: &str) -> Result<String> {
        Ok(format!("{}{}", self.active_prefix()?, key))
    }
}

// == Cache Implementation ==
impl Cache for SessionCache {
    fn set_prefix(&mut self, prefix: &str) -> Result<&mut dyn Cache> {
        validate_prefix(prefix)?;
        self.prefix = Some(prefix.to_string());
        Ok(self)
    }

    /// Reports the namespace exactly as the caller supplied it.
    fn get_prefix(&self) -> Result<&str> {
        self.active_prefix()
    }

    fn set(&mut self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<&mut dyn Cache> {
        validate_key(key)?;
        let fq = self.fq_key(key)?;

        self.store
            .write()
            .insert(fq, SessionEntry::new(value.to_vec(), ttl_seconds));
        Ok(self)
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let fq = self.fq_key(key)?;

        let mut store = self.store.write();
        match store.get(&fq) {
            Some(entry) if entry.is_live(Utc::now()) => Ok(Some(entry.value.clone())),
            Some(_) => {
                // Lazy expiry: reading a dead entry removes it.
                store.remove(&fq);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn delete(&mut self, key: &str) -> Result<&mut dyn Cache> {
        validate_key(key)?;
        let fq = self.fq_key(key)?;

        self.store.write().remove(&fq);
        Ok(self)
    }

    fn clear(&mut self) -> Result<&mut dyn Cache> {
        let prefix = self.active_prefix()?.to_string();

        self.store
            .write()
            .retain(|key, _| !key.starts_with(&prefix));
        Ok(self)
    }
}
