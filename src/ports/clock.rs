//! Clock port.
//!
//! Every timestamp the domain records (`joined_at`, `started_at`, ...) comes
//! from a `Clock`, so tests can pin time and durations are deterministic.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    /// Current time. Successive calls never go backwards.
    fn now(&self) -> Timestamp;
}
