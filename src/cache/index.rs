//! Cache Index Module
//!
//! The durable registry of every entry stored in a file-backed cache
//! directory: fully-qualified key to TTL and creation time. One index file
//! serves all namespaces sharing the directory.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::cache::expiry;
use crate::error::{CacheError, Result};

// == Constants ==
/// Well-known index file name inside a cache directory.
///
/// Normalized entry names never contain a dot, so the index can never
/// collide with a value artifact.
pub(crate) const INDEX_FILE: &str = "cache-index.json";

// == Index Entry ==
/// Expiry metadata for a single cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Time to live in seconds, 0 = never expires
    pub ttl_seconds: u64,
    /// Timestamp of the write that created the entry
    pub created_at: DateTime<Utc>,
}

impl IndexEntry {
    /// Creates metadata for an entry written right now.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            created_at: Utc::now(),
        }
    }

    /// Checks whether the entry is still live at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        expiry::is_live(self.ttl_seconds, self.created_at, now)
    }
}

// == Cache Index ==
/// In-memory mirror of the on-disk index file.
///
/// Serialized as a single JSON object mapping fully-qualified keys to their
/// expiry metadata, pretty-printed so the file stays inspectable by hand.
/// Key order is stable because the map is a `BTreeMap`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl CacheIndex {
    /// Loads the index from `path`.
    ///
    /// A missing file is the normal first run and yields an empty index. An
    /// unreadable or unparsable file also yields an empty index, after a
    /// warning: the cache heals by behaving as empty rather than failing.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache index, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(index) => index,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache index, starting empty");
                Self::default()
            }
        }
    }

    /// Writes the index to `path`, replacing the previous file atomically.
    ///
    /// The content is staged in a uniquely named temporary file in the same
    /// directory and installed by rename, so a concurrent reader observes
    /// either the old index or the new one, never a torn file.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| CacheError::Storage(format!("failed to encode cache index: {e}")))?;

        let dir = path.parent().ok_or_else(|| {
            CacheError::Storage(format!(
                "cache index path `{}` has no parent directory",
                path.display()
            ))
        })?;

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| CacheError::Storage(format!("failed to stage cache index: {e}")))?;
        tmp.write_all(&json)
            .map_err(|e| CacheError::Storage(format!("failed to write cache index: {e}")))?;
        tmp.persist(path)
            .map_err(|e| CacheError::Storage(format!("failed to replace cache index: {e}")))?;

        Ok(())
    }

    /// Looks up the metadata for a fully-qualified key.
    pub fn get(&self, fq_key: &str) -> Option<&IndexEntry> {
        self.entries.get(fq_key)
    }

    /// Registers or replaces the metadata for a fully-qualified key.
    pub fn insert(&mut self, fq_key: String, entry: IndexEntry) {
        self.entries.insert(fq_key, entry);
    }

    /// Removes a fully-qualified key, returning its metadata if it was
    /// present.
    pub fn remove(&mut self, fq_key: &str) -> Option<IndexEntry> {
        self.entries.remove(fq_key)
    }

    /// Collects every fully-qualified key starting with `prefix`.
    ///
    /// Linear scan over all namespaces sharing the directory; the cache
    /// targets small to moderate entry counts.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of entries across every namespace.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
