//! Outcome of a room mutation.

/// Result of applying a command to a room.
///
/// `Changed` carries the sequence number allotted to the mutation; exactly one
/// domain event must be published with it. `Unchanged` is the documented
/// idempotent no-op path and publishes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    Changed { value: T, sequence: u64 },
    Unchanged(T),
}

impl<T> Applied<T> {
    /// The resulting aggregate state.
    pub fn value(&self) -> &T {
        match self {
            Applied::Changed { value, .. } | Applied::Unchanged(value) => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Applied::Changed { value, .. } | Applied::Unchanged(value) => value,
        }
    }

    /// Sequence allotted to the change, if any.
    pub fn sequence(&self) -> Option<u64> {
        match self {
            Applied::Changed { sequence, .. } => Some(*sequence),
            Applied::Unchanged(_) => None,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Applied::Changed { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        match self {
            Applied::Changed { value, sequence } => Applied::Changed {
                value: f(value),
                sequence,
            },
            Applied::Unchanged(value) => Applied::Unchanged(f(value)),
        }
    }
}
