//! Injected time source.
//!
//! The core never reads the clock; timestamps enter `append` as caller
//! arguments. This capability produces them at the recording boundary,
//! so tests can substitute deterministic values.

use chrono::{SecondsFormat, Utc};

/// Source of RFC 3339 UTC timestamps with millisecond precision and a
/// trailing `Z`.
pub trait Clock: Send + Sync {
    /// The current instant, e.g. `2024-01-01T12:34:56.789Z`.
    fn now(&self) -> String;
}

/// Wall-clock implementation.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Fixed-instant clock for deterministic tests.
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_format() {
        let now = SystemClock.now();
        // 2024-01-01T00:00:00.000Z is 24 chars
        assert_eq!(now.len(), 24);
        assert!(now.ends_with('Z'));
        assert_eq!(&now[4..5], "-");
        assert_eq!(&now[10..11], "T");
        assert_eq!(&now[19..20], ".");
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock("2024-01-01T00:00:00.000Z".into());
        assert_eq!(clock.now(), clock.now());
    }
}
