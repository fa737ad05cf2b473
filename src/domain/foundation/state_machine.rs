//! Lifecycle enums declare their legal moves as a table.

use std::fmt;

/// A status enum whose transitions are listed per state.
pub trait StateMachine: Sized + Copy + PartialEq + fmt::Debug + fmt::Display + 'static {
    /// States reachable in one step from `self`.
    fn valid_transitions(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn transition_to(&self, target: Self) -> Result<Self, IllegalTransition<Self>> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(IllegalTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// No outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

/// A move the table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalTransition<S> {
    pub from: S,
    pub to: S,
}

impl<S: fmt::Display> fmt::Display for IllegalTransition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot transition from {} to {}", self.from, self.to)
    }
}

impl<S: fmt::Debug + fmt::Display> std::error::Error for IllegalTransition<S> {}
