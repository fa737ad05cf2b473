//! Context that travels with every inbound command.
//!
//! `user_id` is the authenticated actor. Handlers authorize against it and
//! copy it, together with the correlation and trace ids, onto the envelope
//! of the event the command produces.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub user_id: UserId,

    /// Fresh UUID unless the caller supplies the request id.
    correlation_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl CommandMetadata {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: Uuid::new_v4().to_string(),
            trace_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}
