//! Clock abstraction so expiry and boundary logic is deterministic in tests.

use chrono::{DateTime, Utc};

/// Source of current time for expiry checks and timestamps.
pub trait Clock: Send + Sync {
    /// Get the current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current time as milliseconds since the Unix epoch.
    ///
    /// Used for the `issuedAtMillis` component of license key payloads.
    fn now_millis(&self) -> i64 {
        self.now_utc().timestamp_millis()
    }
}

/// Production clock backed by wall time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for deterministic tests.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    now: DateTime<Utc>,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Create a mock clock frozen at the given instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Create a mock clock from an RFC 3339 string.
    pub fn from_rfc3339(s: &str) -> Self {
        Self {
            now: DateTime::parse_from_rfc3339(s)
                .expect("valid RFC 3339")
                .with_timezone(&Utc),
        }
    }

    /// Advance the frozen instant by a duration.
    pub fn advance(&mut self, duration: chrono::Duration) {
        self.now += duration;
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_is_frozen() {
        let clock = MockClock::from_rfc3339("2025-06-01T00:00:00Z");
        assert_eq!(clock.now_utc(), clock.now_utc());
        assert_eq!(clock.now_millis(), 1748736000000);
    }

    #[test]
    fn mock_clock_advances() {
        let mut clock = MockClock::from_rfc3339("2025-06-01T00:00:00Z");
        clock.advance(chrono::Duration::milliseconds(1));
        assert_eq!(clock.now_utc().to_rfc3339(), "2025-06-01T00:00:00.001+00:00");
    }

    #[test]
    fn system_clock_is_sane() {
        let now = SystemClock.now_utc();
        assert!(now.timestamp() > 1_700_000_000);
    }
}
