//! Lifecycle middleware that logs every phase.

use crate::error::BoxError;
use crate::http::{Request, Response};
use crate::middleware::types::{Flow, HookResult, Lifecycle};

/// Emits one `tracing` event per lifecycle phase and always proceeds.
#[derive(Debug, Clone)]
pub struct TraceMiddleware {
    name: String,
}

impl TraceMiddleware {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TraceMiddleware {
    fn default() -> Self {
        Self::new("trace")
    }
}

impl Lifecycle for TraceMiddleware {
    fn entered(&self, request: &Request) -> HookResult {
        tracing::info!(middleware = %self.name, method = %request.method, uri = %request.uri, "entered");
        Ok(Flow::Proceed)
    }

    fn updated(&self, request: &Request, response: &Response) -> HookResult {
        tracing::info!(
            middleware = %self.name,
            method = %request.method,
            uri = %request.uri,
            status = response.status,
            "updated"
        );
        Ok(Flow::Proceed)
    }

    fn failed(&self, request: &Request, response: &Response) -> HookResult {
        tracing::warn!(
            middleware = %self.name,
            method = %request.method,
            uri = %request.uri,
            status = response.status,
            errors = ?response.errors,
            "failed"
        );
        Ok(Flow::Proceed)
    }

    fn exited(&self, request: &Request) -> Result<(), BoxError> {
        tracing::info!(middleware = %self.name, uri = %request.uri, "exited");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
