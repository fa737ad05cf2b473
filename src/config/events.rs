//! Event fan-out configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Sizing for the per-session broadcast channels.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Events buffered per session before slow subscribers start lagging
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl EventsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channel_capacity == 0 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}
