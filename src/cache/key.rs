//! Key Normalization Module
//!
//! Maps caller-supplied keys and namespace prefixes to tokens that are safe
//! to use as file names and index keys.

use crate::error::{CacheError, Result};

// == Normalization ==
/// Maps a raw key or prefix to a filesystem-safe token.
///
/// Every maximal run of characters outside `[0-9A-Za-z]` is replaced with a
/// single `-`, so `"user:1"` becomes `"user-1"` and `"a//b"` becomes
/// `"a-b"`. The mapping is deterministic but lossy: distinct raw keys such
/// as `"a/b"` and `"a b"` collapse to the same token. Callers that need
/// collision-free storage must choose raw keys that stay distinct after
/// normalization.
///
/// # Arguments
/// * `raw` - The key or prefix as the caller supplied it
///
/// # Returns
/// The normalized token, containing only ASCII alphanumerics and `-`
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }

    out
}

// == Validation ==
/// Rejects keys that are empty or contain nothing but whitespace.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(CacheError::InvalidArgument(
            "key must not be empty or whitespace-only".to_string(),
        ));
    }
    Ok(())
}

/// Rejects namespace prefixes that are empty or contain nothing but
/// whitespace.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.trim().is_empty() {
        return Err(CacheError::InvalidArgument(
            "prefix must not be empty or whitespace-only".to_string(),
        ));
    }
    Ok(())
}
