use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use crate::config::Settings;
use crate::error::Result;
use crate::http::{Request, RequestId, Response, TransportError};
use crate::middleware::Dispatcher;
use crate::navigation::{History, HistoryState};
use crate::observability::metrics;

/// Completion or failure callback.
pub type ResponseCallback = Box<dyn FnOnce(&Request, &Response) + Send>;

/// Per-submission callbacks, both optional.
#[derive(Default)]
pub struct Callbacks {
    pub on_success: Option<ResponseCallback>,
    pub on_failure: Option<ResponseCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Request, &Response) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Request, &Response) + Send + 'static,
    {
        self.on_failure = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "response", rename_all = "lowercase")]
pub enum Completion {
    Completed(Response),
    Failed(Response),
}

impl Completion {
    pub fn response(&self) -> &Response {
        match self {
            Completion::Completed(r) | Completion::Failed(r) => r,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Completion::Completed(_))
    }
}

/// Drives one request through transform, lifecycle and transport.
#[derive(Clone)]
pub struct RequestPipeline {
    dispatcher: Dispatcher,
    settings: Arc<Settings>,
    history: Arc<dyn History>,
}

impl RequestPipeline {
    pub fn new(dispatcher: Dispatcher, settings: Arc<Settings>, history: Arc<dyn History>) -> Self {
        Self {
            dispatcher,
            settings,
            history,
        }
    }

    /// Submit `request`.
    ///
    /// Transport failures come back as `Ok(Completion::Failed)`; `Err` is
    /// reserved for middleware errors, which abort the submission.
    pub async fn submit(&self, request: Request, callbacks: Callbacks) -> Result<Completion> {
        let id = RequestId::new();
        let span = tracing::info_span!(
            "submit",
            request_id = %id,
            method = %request.method,
            uri = %request.uri,
        );
        self.run(request, callbacks).instrument(span).await
    }

    async fn run(&self, request: Request, callbacks: Callbacks) -> Result<Completion> {
        let method = request.method;
        let request = match self.settings.transformer(method) {
            Some(transformer) => transformer.apply(request),
            None => request,
        };
        tracing::debug!(uri = %request.uri, "Request prepared");

        self.dispatcher.exited()?;
        // The routes matched now are the ones that see the outcome.
        let routes = self
            .dispatcher
            .registry()
            .active_routes(&request.uri, request.method);
        self.dispatcher.entered(&routes, &request)?;

        let outcome = match self.settings.transport() {
            Some(transport) => transport.fetch(&request).await,
            None => Err(TransportError::NotConfigured),
        };

        match outcome {
            Ok(response) => {
                tracing::info!(status = response.status, "Request completed");
                if let Some(directive) = &request.history {
                    let state = HistoryState {
                        request: request.clone(),
                        response: response.clone(),
                    };
                    self.history.push_state(
                        state,
                        directive.title.as_deref(),
                        directive.uri.as_deref(),
                    );
                }
                self.dispatcher.updated(&routes, &request, &response)?;
                metrics::record_submission(method, true);
                if let Some(on_success) = callbacks.on_success {
                    on_success(&request, &response);
                }
                Ok(Completion::Completed(response))
            }
            Err(error) => {
                tracing::warn!(error = %error, "Request failed");
                let response = error.into_response();
                self.dispatcher.failed(&routes, &request, &response)?;
                metrics::record_submission(method, false);
                if let Some(on_failure) = callbacks.on_failure {
                    on_failure(&request, &response);
                }
                Ok(Completion::Failed(response))
            }
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
