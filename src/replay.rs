//! Scripted replay of host signals and submissions.
//!
//! A script is a TOML file:
//!
//! ```toml
//! [[routes]]
//! method = "GET"        # omitted: active for every verb and sub-path
//! uri = "/users/:id"
//! name = "users"
//!
//! [[steps]]
//! action = "ready_state"
//! state = "interactive"
//! location = "/"
//!
//! [[steps]]
//! action = "submit"
//! method = "GET"
//! uri = "/users/1"
//! history = { uri = "/users/1", title = "User" }
//!
//! [[steps]]
//! action = "back"
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::App;
use crate::config::AppConfig;
use crate::http::{Method, Request, RequestOptions, Response};
use crate::middleware::{Middleware, TraceMiddleware};
use crate::navigation::{HistoryState, HostSignal, MemoryHistory, ReadyState};
use crate::pipeline::Completion;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    App(#[from] crate::error::Error),
}

/// A route registered before the steps run.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptRoute {
    /// `None` mounts the route as `use` middleware.
    pub method: Option<Method>,
    pub uri: String,
    pub name: Option<String>,
}

/// One replay step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    ReadyState {
        state: ReadyState,
        #[serde(default)]
        location: Option<String>,
    },
    /// Pop carrying an explicit request; without one the pop has no state.
    Pop {
        request: Option<Request>,
        response: Option<Response>,
    },
    Back,
    Forward,
    Unload,
    Submit {
        method: Method,
        #[serde(flatten)]
        options: RequestOptions,
    },
}

impl Step {
    fn action(&self) -> &'static str {
        match self {
            Step::ReadyState { .. } => "ready_state",
            Step::Pop { .. } => "pop",
            Step::Back => "back",
            Step::Forward => "forward",
            Step::Unload => "unload",
            Step::Submit { .. } => "submit",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub routes: Vec<ScriptRoute>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(content: &str) -> Result<Self, ReplayError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// What one step produced.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
}

/// An application wired for replay, with a history the steps can walk.
pub struct Replay {
    app: App,
    history: Arc<MemoryHistory>,
    location: String,
}

impl Replay {
    pub fn new(config: &AppConfig, script: &Script) -> Result<Self, ReplayError> {
        let location = config.navigation.initial_location.clone();
        let history = Arc::new(MemoryHistory::new(location.clone()));
        let app = App::from_config(config)?.with_history(history.clone());

        app.use_middleware(Middleware::lifecycle(TraceMiddleware::default()))?;
        for route in &script.routes {
            let name = route.name.clone().unwrap_or_else(|| route.uri.clone());
            let middleware = Middleware::lifecycle(TraceMiddleware::new(name));
            match route.method {
                Some(method) => app.add_route(&route.uri, Some(method), middleware)?,
                None => app.mount(Some(&route.uri), middleware)?,
            };
        }

        Ok(Self {
            app,
            history,
            location,
        })
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub async fn run(&self, steps: &[Step]) -> Result<Vec<StepReport>, ReplayError> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            tracing::debug!(step = index, action = step.action(), "Replaying step");
            let completion = self.play(step).await?;
            reports.push(StepReport {
                step: index,
                action: step.action(),
                completion,
            });
        }
        Ok(reports)
    }

    async fn play(&self, step: &Step) -> Result<Option<Completion>, ReplayError> {
        match step {
            Step::ReadyState { state, location } => {
                let location = location.clone().unwrap_or_else(|| self.location.clone());
                self.app.handle_signal(HostSignal::ready_state(*state, location))?;
            }
            Step::Pop { request, response } => {
                let state = request.clone().map(|request| HistoryState {
                    request,
                    response: response.clone().unwrap_or_else(Response::ok),
                });
                self.app.handle_signal(HostSignal::pop(state))?;
            }
            Step::Back => {
                if let Some(signal) = self.history.back() {
                    self.app.handle_signal(signal)?;
                }
            }
            Step::Forward => {
                if let Some(signal) = self.history.forward() {
                    self.app.handle_signal(signal)?;
                }
            }
            Step::Unload => self.app.handle_signal(HostSignal::BeforeUnload)?,
            Step::Submit { method, options } => {
                let completion = self.app.submission(*method, options.clone()).send().await?;
                return Ok(Some(completion));
            }
        }
        Ok(None)
    }
}
