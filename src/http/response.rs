//! Response model.

use serde::{Deserialize, Serialize};

/// Outcome of a transport call, or a synthesized navigation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status; `0` when the request never reached a server.
    pub status: u16,
    pub status_text: String,
    /// Response body as text.
    #[serde(default)]
    pub payload: Option<String>,
    /// Transport-level error description, if any.
    #[serde(default)]
    pub errors: Option<String>,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            payload: None,
            errors: None,
        }
    }

    /// The `200 OK` response synthesized for page-load navigation.
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
