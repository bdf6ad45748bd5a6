//! Cache Module
//!
//! The cache contract and its backends: durable file-backed storage, a
//! session-backed store over a caller-owned in-memory context, and a no-op
//! backend for switching caching off.

mod blobs;
mod expiry;
mod file;
mod index;
mod key;
mod null;
mod session;


// Re-export public types
pub use file::FileCache;
pub use index::{CacheIndex, IndexEntry};
pub use key::normalize;
pub use null::NullCache;
pub use session::{SessionCache, SessionEntry, SessionStore};

use crate::error::Result;

// == Cache Contract ==
/// The operation set every backend implements with identical semantics.
///
/// A cache stores byte values under caller-chosen keys inside a namespace
/// selected up front with [`Cache::set_prefix`]. Every entry carries a time
/// to live in seconds; a TTL of zero means the entry never expires. Expiry
/// is lazy: liveness is evaluated when an entry is read, never by a
/// background task, and reading an expired entry deletes it as a side
/// effect.
///
/// Mutating operations return `&mut dyn Cache` so calls can be chained and
/// callers can hold any backend behind the same trait object:
///
/// ```
/// use cachette::{Cache, NullCache};
///
/// # fn main() -> cachette::Result<()> {
/// let mut cache = NullCache;
/// cache.set("greeting", b"hello", 60)?.set("other", b"bytes", 0)?;
/// assert!(cache.get("greeting")?.is_none()); // the null backend never stores
/// # Ok(())
/// # }
/// ```
pub trait Cache {
    /// Selects the active namespace for every subsequent operation.
    ///
    /// Calling it again replaces the namespace; entries written under the
    /// previous one stay untouched and become reachable again by switching
    /// back.
    ///
    /// # Errors
    /// [`CacheError::InvalidArgument`](crate::error::CacheError) if the
    /// prefix is empty or whitespace-only.
    fn set_prefix(&mut self, prefix: &str) -> Result<&mut dyn Cache>;

    /// Reports the active namespace in the form the backend addresses it:
    /// normalized for the file backend, verbatim for the session backend,
    /// and a fixed sentinel for the null backend.
    ///
    /// # Errors
    /// [`CacheError::Configuration`](crate::error::CacheError) if the
    /// backend requires a namespace and none was selected.
    fn get_prefix(&self) -> Result<&str>;

    /// Stores `value` under `key` in the active namespace.
    ///
    /// Overwriting an existing key replaces both the value and the TTL.
    /// `ttl_seconds` of zero means the entry never expires.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty key, `Configuration` when no
    /// namespace is selected, `Storage` when the backing store fails.
    fn set(&mut self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<&mut dyn Cache>;

    /// Retrieves the value stored under `key` in the active namespace.
    ///
    /// Returns `Ok(None)` when the key was never stored, was deleted, or
    /// has expired. Reading an expired entry removes it, so a later
    /// inspection of the backend shows no trace of it.
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Removes the entry stored under `key` in the active namespace.
    ///
    /// Deleting an absent key succeeds; delete is idempotent.
    fn delete(&mut self, key: &str) -> Result<&mut dyn Cache>;

    /// Removes every entry of the active namespace, leaving other
    /// namespaces sharing the same backing store untouched.
    fn clear(&mut self) -> Result<&mut dyn Cache>;
}
