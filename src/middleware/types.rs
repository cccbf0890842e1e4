use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BoxError;
use crate::http::{Request, Response};

/// Lifecycle phase of a dispatch pass.
///
/// Decides which middleware hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// The route became active for a request that is still in flight.
    Entered,
    /// The request completed; the route is now visited.
    Updated,
    /// The request failed; the route is not marked visited.
    Failed,
    /// A visited route is being retired.
    Exited,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Entered => "entered",
            Phase::Updated => "updated",
            Phase::Failed => "failed",
            Phase::Exited => "exited",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Continuation signal returned by every middleware invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running the remaining middleware of this pass.
    Proceed,
    /// Stop the pass after this middleware.
    Halt,
}

impl Flow {
    pub fn is_halt(&self) -> bool {
        matches!(self, Flow::Halt)
    }
}

impl From<bool> for Flow {
    /// `true` proceeds, `false` halts.
    fn from(proceed: bool) -> Self {
        if proceed {
            Flow::Proceed
        } else {
            Flow::Halt
        }
    }
}

/// Result of a single hook invocation.
pub type HookResult = Result<Flow, BoxError>;

/// Middleware with per-phase hooks.
///
/// Every hook defaults to a no-op that proceeds, so implementors only
/// override the phases they care about.
pub trait Lifecycle: Send + Sync {
    fn entered(&self, _request: &Request) -> HookResult {
        Ok(Flow::Proceed)
    }

    fn updated(&self, _request: &Request, _response: &Response) -> HookResult {
        Ok(Flow::Proceed)
    }

    fn failed(&self, _request: &Request, _response: &Response) -> HookResult {
        Ok(Flow::Proceed)
    }

    /// Receives the request stored when the route was last updated.
    fn exited(&self, _request: &Request) -> Result<(), BoxError> {
        Ok(())
    }

    /// Optional descriptive name, used in logs.
    fn name(&self) -> &str {
        "lifecycle"
    }
}

type HandlerFn = dyn Fn(&Request, &Response) -> HookResult + Send + Sync;

/// Middleware bound to a route.
#[derive(Clone)]
pub enum Middleware {
    /// Object exposing lifecycle hooks.
    Lifecycle(Arc<dyn Lifecycle>),
    /// Plain function run on `updated` and `failed` only.
    Handler(Arc<HandlerFn>),
}

impl Middleware {
    pub fn lifecycle<L: Lifecycle + 'static>(hooks: L) -> Self {
        Middleware::Lifecycle(Arc::new(hooks))
    }

    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&Request, &Response) -> HookResult + Send + Sync + 'static,
    {
        Middleware::Handler(Arc::new(f))
    }

    /// Run the hook for `phase`.
    ///
    /// `response` is ignored by `entered` and `exited`; missing hooks proceed.
    pub fn invoke(&self, phase: Phase, request: &Request, response: &Response) -> HookResult {
        match (self, phase) {
            (Middleware::Lifecycle(hooks), Phase::Entered) => hooks.entered(request),
            (Middleware::Lifecycle(hooks), Phase::Updated) => hooks.updated(request, response),
            (Middleware::Lifecycle(hooks), Phase::Failed) => hooks.failed(request, response),
            (Middleware::Lifecycle(hooks), Phase::Exited) => {
                hooks.exited(request).map(|()| Flow::Proceed)
            }
            (Middleware::Handler(f), Phase::Updated | Phase::Failed) => f(request, response),
            (Middleware::Handler(_), Phase::Entered | Phase::Exited) => Ok(Flow::Proceed),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Middleware::Lifecycle(hooks) => hooks.name(),
            Middleware::Handler(_) => "handler",
        }
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Middleware::Lifecycle(hooks) => f.debug_tuple("Lifecycle").field(&hooks.name()).finish(),
            Middleware::Handler(_) => f.write_str("Handler"),
        }
    }
}

impl<L: Lifecycle + 'static> From<Arc<L>> for Middleware {
    fn from(hooks: Arc<L>) -> Self {
        Middleware::Lifecycle(hooks)
    }
}
