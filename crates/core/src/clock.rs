//! Time source injected into the ledger engine.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// Supplies the instant used to stamp new accounts and transactions.
///
/// The engine never reads a system clock directly; swapping in a
/// [`FixedClock`] makes time-window behavior fully deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock returning a programmed instant, advanced explicitly.
///
/// Stores the instant as microseconds since the epoch so concurrent readers
/// need no locking.
#[derive(Debug)]
pub struct FixedClock {
    micros: AtomicI64,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            micros: AtomicI64::new(start.timestamp_micros()),
        }
    }

    /// Moves the clock forward by the given step.
    pub fn advance(&self, step: Duration) {
        self.micros
            .fetch_add(step.num_microseconds().unwrap_or(0), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_fixed_clock_is_frozen() {
        let clock = FixedClock::new(instant("2026-01-15T12:00:00Z"));
        assert_eq!(clock.now(), instant("2026-01-15T12:00:00Z"));
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(instant("2026-01-15T12:00:00Z"));
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), instant("2026-01-15T12:01:30Z"));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
