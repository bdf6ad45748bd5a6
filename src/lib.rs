//! Cachette - A pluggable key-value cache
//!
//! Provides one [`Cache`] contract with interchangeable backends: durable
//! file-backed storage, a session-backed store over a caller-owned context,
//! and a no-op backend. Entries carry a per-write TTL and expire lazily on
//! read.
//!
//! # Example
//!
//! ```
//! use cachette::{Cache, FileCache};
//!
//! # fn main() -> cachette::Result<()> {
//! let dir = tempfile::tempdir().unwrap();
//! let mut cache = FileCache::with_prefix(dir.path(), "sessions")?;
//!
//! cache.set("user:1", b"alice", 60)?;
//! assert_eq!(cache.get("user:1")?, Some(b"alice".to_vec()));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;

pub use cache::{
    normalize, Cache, CacheIndex, FileCache, IndexEntry, NullCache, SessionCache, SessionEntry,
    SessionStore,
};
pub use error::{CacheError, Result};
