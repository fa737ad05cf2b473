//! Clock adapters.

use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall clock that never runs backwards.
///
/// If the system time steps back, the last reading is returned until the
/// wall clock catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<Timestamp>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let wall = Timestamp::now();
        let now = match *last {
            Some(previous) if wall.is_before(&previous) => previous,
            _ => wall,
        };
        *last = Some(now);
        now
    }
}

/// Clock that only moves when told to. For tests.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn set(&self, at: Timestamp) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = current.plus_secs(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
