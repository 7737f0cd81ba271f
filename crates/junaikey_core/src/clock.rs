//! Injectable wall clock.
//!
//! Stores stamp `created_at`/`updated_at` through this port so merge
//! ordering can be driven deterministically in tests.

use crate::util::lock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock.
///
/// Every `now()` call returns the current instant and then advances it by
/// `tick`, so consecutive stamps stay strictly ordered.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    current: DateTime<Utc>,
    tick: Duration,
}

impl ManualClock {
    /// Starts at `start` with a one-millisecond auto tick.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::with_tick(start, Duration::milliseconds(1))
    }

    pub fn with_tick(start: DateTime<Utc>, tick: Duration) -> Self {
        Self {
            state: Mutex::new(ManualState {
                current: start,
                tick,
            }),
        }
    }

    /// Moves the clock forward without producing a stamp.
    pub fn advance(&self, by: Duration) {
        let mut state = lock(&self.state);
        state.current += by;
    }

    /// Returns the next stamp without advancing.
    pub fn peek(&self) -> DateTime<Utc> {
        lock(&self.state).current
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut state = lock(&self.state);
        let stamp = state.current;
        let tick = state.tick;
        state.current += tick;
        stamp
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn manual_clock_stamps_are_strictly_increasing() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let first = clock.now();
        let second = clock.now();
        assert_eq!(first, start);
        assert!(second > first);

        clock.advance(Duration::hours(1));
        assert!(clock.now() - second >= Duration::hours(1));
    }

    #[test]
    fn custom_tick_spaces_consecutive_stamps() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::with_tick(start, Duration::seconds(5));

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(5));
        assert_eq!(clock.peek(), start + Duration::seconds(10));
    }
}
