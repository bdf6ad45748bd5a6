//! Null Cache Module
//!
//! A backend that stores nothing. Useful to switch caching off without
//! changing call sites.

use crate::cache::key::{validate_key, validate_prefix};
use crate::cache::Cache;
use crate::error::Result;

/// Fixed namespace reported by the null backend.
const NO_PREFIX: &str = "no-prefix";

// == Null Cache ==
/// The no-op backend: every operation succeeds, nothing is stored, every
/// read misses.
///
/// Caller input is still validated, so swapping a real backend in or out
/// never changes which calls fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    /// Accepts and discards the namespace.
    fn set_prefix(&mut self, prefix: &str) -> Result<&mut dyn Cache> {
        validate_prefix(prefix)?;
        Ok(self)
    }

    /// Always reports the fixed sentinel `"no-prefix"`.
    fn get_prefix(&self) -> Result<&str> {
        Ok(NO_PREFIX)
    }

    fn set(&mut self, key: &str, _value: &[u8], _ttl_seconds: u64) -> Result<&mut dyn Cache> {
        validate_key(key)?;
        Ok(self)
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(None)
    }

    fn delete(&mut self, key: &str) -> Result<&mut dyn Cache> {
        validate_key(key)?;
        Ok(self)
    }

    fn clear(&mut self) -> Result<&mut dyn Cache> {
        Ok(self)
    }
}
