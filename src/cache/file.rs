//! File Cache Module
//!
//! The durable backend: values live as one file per fully-qualified key
//! inside a caller-supplied directory, and a single JSON index records every
//! entry's TTL and creation time. Several namespaces may share one
//! directory; each cache instance addresses only its own.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::cache::blobs::BlobStore;
use crate::cache::index::{CacheIndex, IndexEntry, INDEX_FILE};
use crate::cache::key::{normalize, validate_key, validate_prefix};
use crate::cache::Cache;
use crate::error::{CacheError, Result};

// == File Cache ==
/// Durable cache backend over a filesystem directory.
///
/// Existence is decided by the index, never by scanning the directory: an
/// entry exists exactly while the index lists it. Every mutation rewrites
/// the index file atomically, and the value blob is written before the
/// index references it, so a crash between the two steps leaves at worst an
/// orphaned blob, never an index entry pointing at missing bytes.
///
/// Expiry is lazy. Reading an expired entry removes both the blob and the
/// index entry and reports a miss.
#[derive(Debug)]
pub struct FileCache {
    /// Active namespace in normalized form, None until selected
    prefix: Option<String>,
    /// Value artifacts, one file per fully-qualified key
    blobs: BlobStore,
    /// In-memory mirror of the index file
    index: CacheIndex,
    /// Location of the index file inside the cache directory
    index_path: PathBuf,
}

impl FileCache {
    // == Constructor ==
    /// Opens a cache over an existing directory.
    ///
    /// The directory must already exist and be writable; the cache never
    /// creates it. A missing index file is the normal first run and starts
    /// empty; a corrupt one is replaced on the next mutation. No namespace
    /// is selected yet, so key operations fail until [`Cache::set_prefix`]
    /// is called.
    ///
    /// # Arguments
    /// * `cache_dir` - Directory holding the index file and value artifacts
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = cache_dir.as_ref().to_path_buf();

        if !dir.is_dir() {
            return Err(CacheError::Configuration(format!(
                "cache directory `{}` does not exist or is not a directory",
                dir.display()
            )));
        }

        // Writability probe; the temp file is removed again on drop.
        NamedTempFile::new_in(&dir).map_err(|e| {
            CacheError::Configuration(format!(
                "cache directory `{}` is not writable: {e}",
                dir.display()
            ))
        })?;

        let index_path = dir.join(INDEX_FILE);
        let index = CacheIndex::load(&index_path);

        let cache = Self {
            prefix: None,
            blobs: BlobStore::new(dir),
            index,
            index_path,
        };

        // First use of a fresh directory: materialize the empty index so a
        // later reader finds a well-formed file.
        if !cache.index_path.exists() {
            cache.index.persist(&cache.index_path).map_err(|e| {
                CacheError::Configuration(format!("cannot initialize cache index: {e}"))
            })?;
        }

        Ok(cache)
    }

    /// Opens a cache over an existing directory and selects a namespace in
    /// one step.
    ///
    /// # Arguments
    /// * `cache_dir` - Directory holding the index file and value artifacts
    /// * `prefix` - Namespace for every subsequent key operation
    pub fn with_prefix(cache_dir: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let mut cache = Self::new(cache_dir)?;
        cache.set_prefix(prefix)?;
        Ok(cache)
    }

    // == Length ==
    /// Returns the number of indexed entries across every namespace sharing
    /// the directory.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    /// Returns true if the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Helpers ==
    /// Active namespace, or a configuration error if none was selected.
    fn active_prefix(&self) -> Result<&str> {
        self.prefix.as_deref().ok_or_else(|| {
            CacheError::Configuration(
                "no namespace selected; call set_prefix before using the cache".to_string(),
            )
        })
    }

    /// Fully-qualified name for a raw key: normalized prefix followed by the
    /// normalized key.
    fn fq_key(&self, key: &str) -> Result<String> {
        Ok(format!("{}{}", self.active_prefix()?, normalize(key)))
    }

    /// Removes both halves of an entry without failing.
    ///
    /// Used on the read path, where a dead or damaged entry must surface as
    /// a miss rather than an error. Removal problems are logged and the
    /// in-memory index stays authoritative for this instance.
    fn purge(&mut self, fq_key: &str) {
        self.index.remove(fq_key);

        if let Err(e) = self.blobs.remove(fq_key) {
            warn!(key = %fq_key, error = %e, "Failed to remove value artifact during purge");
        }
        if let Err(e) = self.index.persist(&self.index_path) {
            warn!(key = %fq_key, error = %e, "Failed to persist index during purge");
        }
    }
}

// == Cache Implementation ==
impl Cache for FileCache {
    fn set_prefix(&mut self, prefix: &str) -> Result<&mut dyn Cache> {
        validate_prefix(prefix)?;
        self.prefix = Some(normalize(prefix));
        Ok(self)
    }

    /// Reports the namespace in the normalized form used on disk.
    fn get_prefix(&self) -> Result<&str> {
        self.active_prefix()
    }

    fn set(&mut self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<&mut dyn Cache> {
        validate_key(key)?;
        let fq = self.fq_key(key)?;

        // Value blob first: the index must never reference bytes that were
        // not durably written.
        self.blobs.write(&fq, value).map_err(|e| {
            CacheError::Storage(format!("failed to write value for `{fq}`: {e}"))
        })?;

        self.index.insert(fq.clone(), IndexEntry::new(ttl_seconds));
        self.index.persist(&self.index_path)?;

        debug!(key = %fq, ttl_seconds, bytes = value.len(), "Stored entry");
        Ok(self)
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let fq = self.fq_key(key)?;

        // The index decides existence; the directory is never scanned.
        let Some(entry) = self.index.get(&fq) else {
            return Ok(None);
        };

        if !entry.is_live(Utc::now()) {
            debug!(key = %fq, "Entry expired, purging");
            self.purge(&fq);
            return Ok(None);
        }

        match self.blobs.read(&fq) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Indexed but unreadable: heal by dropping the entry and
                // reporting a miss.
                warn!(key = %fq, error = %e, "Indexed value unreadable, purging entry");
                self.purge(&fq);
                Ok(None)
            }
        }
    }

    fn delete(&mut self, key: &str) -> Result<&mut dyn Cache> {
        validate_key(key)?;
        let fq = self.fq_key(key)?;

        self.blobs.remove(&fq).map_err(|e| {
            CacheError::Storage(format!("failed to remove value for `{fq}`: {e}"))
        })?;

        // Only rewrite the index when something actually changed.
        if self.index.remove(&fq).is_some() {
            self.index.persist(&self.index_path)?;
            debug!(key = %fq, "Deleted entry");
        }

        Ok(self)
    }

    fn clear(&mut self) -> Result<&mut dyn Cache> {
        let namespace = self.active_prefix()?.to_string();
        let doomed = self.index.keys_with_prefix(&namespace);

        for fq in &doomed {
            if let Err(e) = self.blobs.remove(fq) {
                warn!(key = %fq, error = %e, "Failed to remove value artifact during clear");
            }
            self.index.remove(fq);
        }

        if !doomed.is_empty() {
            self.index.persist(&self.index_path)?;
        }

        debug!(namespace = %namespace, removed = doomed.len(), "Cleared namespace");
        Ok(self)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> FileCache {
        FileCache::with_prefix(dir.path(), "sessions").unwrap()
    }

    #[test]
    fn test_file_cache_new_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let result = FileCache::new(&missing);
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_file_cache_new_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"x").unwrap();

        let result = FileCache::new(&file);
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_file_cache_new_materializes_index_file() {
        let dir = TempDir::new().unwrap();
        let _cache = FileCache::new(dir.path()).unwrap();

        assert!(dir.path().join(INDEX_FILE).exists());
    }

    #[test]
    fn test_file_cache_set_and_get() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("user:1", b"alice", 5).unwrap();
        assert_eq!(cache.get("user:1").unwrap(), Some(b"alice".to_vec()));
    }

    #[test]
    fn test_file_cache_get_nonexistent_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        assert_eq!(cache.get("absent").unwrap(), None);
    }

    #[test]
    fn test_file_cache_empty_value_is_distinct_from_miss() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("empty", b"", 0).unwrap();
        assert_eq!(cache.get("empty").unwrap(), Some(Vec::new()));
        assert_eq!(cache.get("absent").unwrap(), None);
    }

    #[test]
    fn test_file_cache_requires_namespace() {
        let dir = TempDir::new().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        assert!(matches!(
            cache.get("user:1"),
            Err(CacheError::Configuration(_))
        ));
        assert!(matches!(
            cache.set("user:1", b"alice", 0),
            Err(CacheError::Configuration(_))
        ));
        assert!(matches!(cache.get_prefix(), Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_file_cache_rejects_empty_key() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        assert!(matches!(
            cache.set("", b"v", 0),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            cache.get("  "),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            cache.delete("\t"),
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_file_cache_rejects_empty_prefix() {
        let dir = TempDir::new().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        assert!(matches!(
            cache.set_prefix("  "),
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_file_cache_prefix_is_reported_normalized() {
        let dir = TempDir::new().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        cache.set_prefix("my app!").unwrap();
        assert_eq!(cache.get_prefix().unwrap(), "my-app-");
    }

    #[test]
    fn test_file_cache_artifact_is_named_by_fq_key() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("user:1", b"alice", 0).unwrap();

        // "sessions" + normalize("user:1")
        assert!(dir.path().join("sessionsuser-1").exists());
    }

    #[test]
    fn test_file_cache_overwrite_replaces_value_and_ttl() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("x", b"1", 60).unwrap();
        cache.set("x", b"2", 0).unwrap();

        assert_eq!(cache.get("x").unwrap(), Some(b"2".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_file_cache_chained_calls() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache
            .set("a", b"1", 0)
            .unwrap()
            .set("b", b"2", 0)
            .unwrap()
            .delete("a")
            .unwrap();

        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.get("b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_file_cache_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("k", b"v", 0).unwrap();
        cache.delete("k").unwrap();
        cache.delete("k").unwrap();
        cache.delete("never-existed").unwrap();

        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_cache_delete_removes_artifact() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("k", b"v", 0).unwrap();
        assert!(dir.path().join("sessionsk").exists());

        cache.delete("k").unwrap();
        assert!(!dir.path().join("sessionsk").exists());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_file_cache_expired_entry_is_purged_on_read() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("short", b"lived", 1).unwrap();
        assert_eq!(cache.get("short").unwrap(), Some(b"lived".to_vec()));

        sleep(Duration::from_millis(1100));

        // Reading the dead entry removes blob and index entry.
        assert_eq!(cache.get("short").unwrap(), None);
        assert!(!dir.path().join("sessionsshort").exists());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_file_cache_heals_missing_blob() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.set("k", b"v", 0).unwrap();
        std::fs::remove_file(dir.path().join("sessionsk")).unwrap();

        assert_eq!(cache.get("k").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_file_cache_index_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut cache = cache(&dir);
            cache.set("user:1", b"alice", 0).unwrap();
        }

        let mut reopened = cache(&dir);
        assert_eq!(reopened.get("user:1").unwrap(), Some(b"alice".to_vec()));
    }

    #[test]
    fn test_file_cache_corrupt_index_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), b"not json at all").unwrap();

        let mut cache = cache(&dir);
        assert!(cache.is_empty());
        assert_eq!(cache.get("anything").unwrap(), None);
    }

    #[test]
    fn test_file_cache_clear_scopes_to_active_namespace() {
        let dir = TempDir::new().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        cache.set_prefix("a").unwrap();
        cache.set("one", b"1", 0).unwrap();
        cache.set("two", b"2", 0).unwrap();

        cache.set_prefix("b").unwrap();
        cache.set("one", b"3", 0).unwrap();

        cache.set_prefix("a").unwrap();
        cache.clear().unwrap();

        assert_eq!(cache.get("one").unwrap(), None);
        assert_eq!(cache.get("two").unwrap(), None);

        cache.set_prefix("b").unwrap();
        assert_eq!(cache.get("one").unwrap(), Some(b"3".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_file_cache_clear_requires_namespace() {
        let dir = TempDir::new().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        assert!(matches!(cache.clear(), Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_file_cache_clear_on_empty_namespace_is_ok() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_file_cache_colliding_keys_share_one_entry() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        // "a/b" and "a b" normalize to the same token.
        cache.set("a/b", b"first", 0).unwrap();
        cache.set("a b", b"second", 0).unwrap();

        assert_eq!(cache.get("a/b").unwrap(), Some(b"second".to_vec()));
        assert_eq!(cache.len(), 1);
    }
}
