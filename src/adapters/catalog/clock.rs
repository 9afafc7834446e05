//! Strictly increasing timestamps for catalog writes

use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::Mutex;

/// Wall clock that never returns the same instant twice
///
/// Readings are truncated to microseconds, the resolution of a PostgreSQL
/// `TIMESTAMPTZ`. When the system clock has not advanced past the previous
/// reading (or has gone backwards) the previous reading plus one
/// microsecond is returned.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut now = Utc::now().trunc_subsecs(6);
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }

    /// Make later ticks exceed `instant` (used after reloading persisted state)
    pub fn observe(&self, instant: DateTime<Utc>) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if last.map_or(true, |previous| instant > previous) {
            *last = Some(instant);
        }
    }
}
