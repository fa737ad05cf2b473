//! Participant roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Speaking role of a session participant.
///
/// The host is not a role: host identity lives on the session itself and the
/// host never holds a participant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    #[default]
    Listener,
    Speaker,
    CoHost,
}

impl ParticipantRole {
    pub const ALL: [ParticipantRole; 3] = [
        ParticipantRole::Listener,
        ParticipantRole::Speaker,
        ParticipantRole::CoHost,
    ];

    /// Only listeners queue for the stage.
    pub fn can_raise_hand(&self) -> bool {
        matches!(self, ParticipantRole::Listener)
    }

    /// Speakers and co-hosts are on stage.
    pub fn is_on_stage(&self) -> bool {
        !matches!(self, ParticipantRole::Listener)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Listener => "listener",
            ParticipantRole::Speaker => "speaker",
            ParticipantRole::CoHost => "co_host",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listener" => Ok(ParticipantRole::Listener),
            "speaker" => Ok(ParticipantRole::Speaker),
            "co_host" | "cohost" => Ok(ParticipantRole::CoHost),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}
