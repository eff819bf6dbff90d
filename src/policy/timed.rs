//! Time-based invalidation.

use std::time::Duration;

use crate::cache::{now_ms, Metadata};
use crate::policy::InvalidationPolicy;

/// Policy that expires entries untouched for longer than a fixed lifetime.
///
/// An entry counts as touched when it is created, read or overwritten.
#[derive(Debug, Clone, Copy)]
pub struct TimedPolicy {
    lifetime: Duration,
}

impl TimedPolicy {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl<V> InvalidationPolicy<V> for TimedPolicy {
    fn is_valid(&self, metadata: &Metadata) -> bool {
        let lifetime_ms = i64::try_from(self.lifetime.as_millis()).unwrap_or(i64::MAX);
        metadata.last_touched() >= now_ms().saturating_sub(lifetime_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::UNSET;

    fn stamped(created: i64, accessed: i64, modified: i64) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.created = created;
        metadata.accessed = accessed;
        metadata.modified = modified;
        metadata
    }

    fn valid(lifetime_ms: u64, metadata: &Metadata) -> bool {
        let policy = TimedPolicy::new(Duration::from_millis(lifetime_ms));
        InvalidationPolicy::<()>::is_valid(&policy, metadata)
    }

    #[test]
    fn test_timed_policy_cases() {
        let now = now_ms();
        let cases = [
            ("create", stamped(now, UNSET, UNSET), 5_000, true),
            ("access", stamped(UNSET, now, UNSET), 5_000, true),
            ("modified", stamped(UNSET, UNSET, now), 5_000, true),
            ("create expired", stamped(now - 5_000, UNSET, UNSET), 1_000, false),
            ("access expired", stamped(UNSET, now - 5_000, UNSET), 1_000, false),
            ("modified expired", stamped(UNSET, UNSET, now - 5_000), 1_000, false),
            (
                "complex not expired",
                stamped(now - 5_000, now - 2_000, now - 1_000),
                10_000,
                true,
            ),
            (
                "complex expired",
                stamped(now - 5_000, now - 20_000, now - 10_000),
                1_000,
                false,
            ),
        ];

        for (name, metadata, lifetime_ms, expected) in cases {
            assert_eq!(valid(lifetime_ms, &metadata), expected, "case '{}'", name);
        }
    }

    #[test]
    fn test_recent_access_keeps_old_entry_alive() {
        let now = now_ms();
        let metadata = stamped(now - 60_000, now, UNSET);
        assert!(valid(1_000, &metadata));
    }

    #[test]
    fn test_huge_lifetime_does_not_overflow() {
        let policy = TimedPolicy::new(Duration::MAX);
        let metadata = stamped(0, UNSET, UNSET);
        assert!(InvalidationPolicy::<()>::is_valid(&policy, &metadata));
        assert_eq!(policy.lifetime(), Duration::MAX);
    }
}
