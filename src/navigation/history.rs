//! Session history.
//!
//! The pipeline pushes a [`HistoryState`] after a completed request that asked
//! for it; the host hands the same state back in a pop signal.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::http::{Request, Response};
use crate::navigation::signal::HostSignal;

/// Request/response pair stored in a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
    pub request: Request,
    pub response: Response,
}

/// Host history stack.
pub trait History: Send + Sync {
    fn push_state(&self, state: HistoryState, title: Option<&str>, uri: Option<&str>);
}

/// One entry of a [`MemoryHistory`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// `None` for the entry the page was loaded on.
    pub state: Option<HistoryState>,
    pub title: Option<String>,
    pub uri: String,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

/// In-process history with back/forward navigation.
///
/// Starts with a single stateless entry for the initial location, like a
/// freshly loaded page.
#[derive(Debug)]
pub struct MemoryHistory {
    stack: Mutex<Stack>,
}

impl MemoryHistory {
    pub fn new(initial_location: impl Into<String>) -> Self {
        Self {
            stack: Mutex::new(Stack {
                entries: vec![HistoryEntry {
                    state: None,
                    title: None,
                    uri: initial_location.into(),
                }],
                cursor: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Stack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn current(&self) -> Option<HistoryEntry> {
        let stack = self.lock();
        stack.entries.get(stack.cursor).cloned()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().entries.clone()
    }

    /// Step back one entry, returning the pop signal the host would deliver.
    pub fn back(&self) -> Option<HostSignal> {
        let mut stack = self.lock();
        if stack.cursor == 0 {
            return None;
        }
        stack.cursor -= 1;
        Some(HostSignal::pop(stack.entries[stack.cursor].state.clone()))
    }

    pub fn forward(&self) -> Option<HostSignal> {
        let mut stack = self.lock();
        if stack.cursor + 1 >= stack.entries.len() {
            return None;
        }
        stack.cursor += 1;
        Some(HostSignal::pop(stack.entries[stack.cursor].state.clone()))
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn push_state(&self, state: HistoryState, title: Option<&str>, uri: Option<&str>) {
        let mut stack = self.lock();
        let uri = match uri {
            Some(uri) => uri.to_string(),
            None => stack
                .entries
                .get(stack.cursor)
                .map(|e| e.uri.clone())
                .unwrap_or_default(),
        };
        // Pushing drops everything ahead of the cursor.
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(HistoryEntry {
            state: Some(state),
            title: title.map(str::to_string),
            uri,
        });
        stack.cursor = stack.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    fn state(uri: &str) -> HistoryState {
        HistoryState {
            request: Request::new(Method::Get, uri),
            response: Response::ok(),
        }
    }

    #[test]
    fn test_back_from_initial_entry() {
        let history = MemoryHistory::new("/");
        assert!(history.back().is_none());
    }

    #[test]
    fn test_push_then_back_yields_stateless_pop() {
        let history = MemoryHistory::new("/");
        history.push_state(state("/a"), Some("A"), Some("/a"));

        assert_eq!(history.current().unwrap().uri, "/a");
        assert_eq!(history.back(), Some(HostSignal::pop(None)));
        assert_eq!(history.forward(), Some(HostSignal::pop(Some(state("/a")))));
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::new("/");
        history.push_state(state("/a"), None, Some("/a"));
        history.push_state(state("/b"), None, Some("/b"));
        history.back();
        history.push_state(state("/c"), None, None);

        let uris: Vec<_> = history.entries().into_iter().map(|e| e.uri).collect();
        // No uri given: the entry keeps the location it was pushed from.
        assert_eq!(uris, ["/", "/a", "/a"]);
        assert!(history.forward().is_none());
    }
}
