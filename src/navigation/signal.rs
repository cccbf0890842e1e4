use serde::{Deserialize, Serialize};

use crate::navigation::history::HistoryState;

/// Document readiness reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// An event delivered by the hosting environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum HostSignal {
    /// Document readiness changed while at `location`.
    ReadyState { state: ReadyState, location: String },
    /// The user moved through history. `None` when the entry carries no state.
    PopState { state: Option<HistoryState> },
    /// The page is about to go away.
    BeforeUnload,
}

impl HostSignal {
    pub fn ready_state(state: ReadyState, location: impl Into<String>) -> Self {
        HostSignal::ReadyState {
            state,
            location: location.into(),
        }
    }

    pub fn pop(state: Option<HistoryState>) -> Self {
        HostSignal::PopState { state }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HostSignal::ReadyState { .. } => "ready_state",
            HostSignal::PopState { .. } => "pop_state",
            HostSignal::BeforeUnload => "before_unload",
        }
    }
}
