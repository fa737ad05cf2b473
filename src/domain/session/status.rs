//! SessionStatus enum for tracking the lifecycle of a live session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a live session.
///
/// ```text
/// Scheduled ──start──► Live ──end──► Ended
///     │
///     └──cancel──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Live,
    Ended,
    Cancelled,
}

impl SessionStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, SessionStatus::Live)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Live => "live",
            SessionStatus::Ended => "ended",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for SessionStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use SessionStatus::*;
        match self {
            Scheduled => &[Live, Cancelled],
            Live => &[Ended],
            Ended | Cancelled => &[],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
