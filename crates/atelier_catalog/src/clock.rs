//! Strictly increasing timestamps.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall clock that never repeats or goes backwards.
///
/// Timestamps have microsecond precision, the precision they are stored
/// with, and each call returns a value strictly later than every earlier one.
/// Ordering by creation time is therefore total and survives a reload.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    /// Create a clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp.
    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let mut previous = self.last_micros.load(Ordering::Acquire);
        loop {
            let next = wall.max(previous.saturating_add(1));
            match self.last_micros.compare_exchange_weak(
                previous,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
                Err(actual) => previous = actual,
            }
        }
    }

    /// Ensure every future timestamp is later than `seen`.
    pub fn observe(&self, seen: DateTime<Utc>) {
        self.last_micros
            .fetch_max(seen.timestamp_micros(), Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_strictly_increasing() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_observe_moves_clock_forward() {
        let clock = MonotonicClock::new();
        let future = Utc::now() + chrono::Duration::hours(1);
        clock.observe(future);
        assert!(clock.now() > future);
    }
}
