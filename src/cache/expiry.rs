//! Expiry Evaluator Module
//!
//! The single liveness rule shared by every backend. Expiry is lazy: nothing
//! scans for dead entries, the decision is made at read time from an entry's
//! recorded TTL and creation timestamp.

use chrono::{DateTime, Utc};

// == Liveness ==
/// Decides whether an entry written at `created_at` with the given TTL is
/// still live at `now`.
///
/// A TTL of zero means the entry never expires. Otherwise the entry is live
/// while `created_at + ttl_seconds` lies strictly in the future, compared at
/// millisecond precision. At exactly `created_at + ttl_seconds` the entry is
/// already expired, so a one-second TTL is readable 0.9s after the write and
/// gone 1.1s after it.
///
/// # Arguments
/// * `ttl_seconds` - Time to live in seconds, 0 = never expires
/// * `created_at` - Timestamp of the write that created the entry
/// * `now` - The instant to evaluate against
pub(crate) fn is_live(ttl_seconds: u64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if ttl_seconds == 0 {
        return true;
    }

    let ttl_ms = ttl_seconds.saturating_mul(1_000);
    created_at
        .timestamp_millis()
        .saturating_add_unsigned(ttl_ms)
        > now.timestamp_millis()
}

// == Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_ttl_zero_never_expires() {
        let created = Utc::now();
        let far_future = created + Duration::days(365 * 10);
        assert!(is_live(0, created, far_future));
    }

    #[test]
    fn test_live_before_deadline() {
        let created = Utc::now();
        let now = created + Duration::milliseconds(900);
        assert!(is_live(1, created, now));
    }

    #[test]
    fn test_expired_after_deadline() {
        let created = Utc::now();
        let now = created + Duration::milliseconds(1_100);
        assert!(!is_live(1, created, now));
    }

    #[test]
    fn test_expired_at_exact_deadline() {
        let created = Utc::now();
        let now = created + Duration::seconds(1);
        assert!(!is_live(1, created, now));
    }

    #[test]
    fn test_expired_long_after_write() {
        let created = Utc::now();
        let now = created + Duration::seconds(6);
        assert!(!is_live(5, created, now));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let created = Utc::now();
        let now = created + Duration::days(365);
        assert!(is_live(u64::MAX, created, now));
    }

    #[test]
    fn test_entry_created_in_future_is_live() {
        let created = Utc::now();
        let now = created - Duration::seconds(30);
        assert!(is_live(1, created, now));
    }
}
