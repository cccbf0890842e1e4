//! Application surface.
//!
//! # Responsibilities
//! - Register middleware per verb, as generic `use` middleware, or as routers
//! - Expose the settings store
//! - Forward host signals to the navigator
//! - Start submissions through per-verb builders
//!
//! # Design Decisions
//! - Every registration creates its own router, so registration order is
//!   invocation order across the whole application
//! - All session state lives in the `App` value; nothing is global

use std::path::Path;
use std::sync::Arc;

use notify::RecommendedWatcher;

use crate::config::{load_config, AppConfig, ConfigWatcher, Setting, Settings};
use crate::error::{Error, Result};
use crate::http::{Method, Request, RequestOptions, Response};
use crate::middleware::{Dispatcher, Middleware};
use crate::navigation::{History, HostSignal, MemoryHistory, Navigator};
use crate::observability::metrics;
use crate::pipeline::{Callbacks, Completion, RequestPipeline};
use crate::routing::{PathRouter, Router, RouterRegistry};

/// Something that can be mounted on an [`App`].
pub enum Mount {
    /// Middleware active on a path and everything below it.
    Middleware(Middleware),
    /// A path router, rebased onto the mount point.
    Router(PathRouter),
    /// Any other router. Only mountable at the root.
    Custom(Arc<dyn Router>),
}

impl From<Middleware> for Mount {
    fn from(middleware: Middleware) -> Self {
        Mount::Middleware(middleware)
    }
}

impl From<PathRouter> for Mount {
    fn from(router: PathRouter) -> Self {
        Mount::Router(router)
    }
}

impl From<Arc<dyn Router>> for Mount {
    fn from(router: Arc<dyn Router>) -> Self {
        Mount::Custom(router)
    }
}

pub struct App {
    registry: Arc<RouterRegistry>,
    settings: Arc<Settings>,
    navigator: Navigator,
    pipeline: RequestPipeline,
}

impl App {
    /// Application with default settings and an in-memory history at `/`.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(Settings::new()), Arc::new(MemoryHistory::default()))
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        metrics::set_enabled(config.observability.metrics_enabled);
        let settings = Settings::from_config(config)?;
        let history = MemoryHistory::new(config.navigation.initial_location.clone());
        Ok(Self::with_parts(Arc::new(settings), Arc::new(history)))
    }

    /// Load, validate and apply a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_config(&load_config(path)?)
    }

    fn with_parts(settings: Arc<Settings>, history: Arc<dyn History>) -> Self {
        let registry = Arc::new(RouterRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone());
        Self {
            navigator: Navigator::new(dispatcher.clone()),
            pipeline: RequestPipeline::new(dispatcher, settings.clone(), history),
            registry,
            settings,
        }
    }

    /// Replace the history completed requests are pushed to.
    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.pipeline = RequestPipeline::new(self.dispatcher(), self.settings.clone(), history);
        self
    }

    pub fn registry(&self) -> &Arc<RouterRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.registry.clone())
    }

    pub fn get(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.route(uri, Some(Method::Get), middleware.into())
    }

    pub fn post(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.route(uri, Some(Method::Post), middleware.into())
    }

    pub fn put(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.route(uri, Some(Method::Put), middleware.into())
    }

    pub fn patch(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.route(uri, Some(Method::Patch), middleware.into())
    }

    pub fn delete(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.route(uri, Some(Method::Delete), middleware.into())
    }

    pub fn all(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.route(uri, None, middleware.into())
    }

    /// Route for `method`; `None` matches every verb on exactly `uri`.
    pub fn add_route(&self, uri: &str, method: Option<Method>, middleware: Middleware) -> Result<&Self> {
        self.route(uri, method, middleware)
    }

    fn route(&self, uri: &str, method: Option<Method>, middleware: Middleware) -> Result<&Self> {
        let router = PathRouter::new();
        router.add_route(uri, method, middleware)?;
        self.registry.register(Arc::new(router));
        Ok(self)
    }

    /// Mount middleware or a router at `uri` (default `/`).
    pub fn mount(&self, uri: Option<&str>, mount: impl Into<Mount>) -> Result<&Self> {
        match mount.into() {
            Mount::Middleware(middleware) => {
                let router = PathRouter::new();
                router.use_middleware(uri, middleware)?;
                self.registry.register(Arc::new(router));
            }
            Mount::Router(router) => {
                self.use_router(uri, router)?;
            }
            Mount::Custom(router) => {
                if uri.is_some_and(|uri| uri != "/") {
                    return Err(Error::invalid(
                        "custom routers can only be mounted at `/`",
                    ));
                }
                self.registry.register(router);
            }
        }
        Ok(self)
    }

    /// Middleware active for every request.
    pub fn use_middleware(&self, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.mount(None, Mount::Middleware(middleware.into()))
    }

    /// Register `router`, rebased onto `uri` when one is given.
    ///
    /// Returns the registered router so more routes can be added to it later.
    pub fn use_router(&self, uri: Option<&str>, router: PathRouter) -> Result<Arc<PathRouter>> {
        let router = match uri {
            Some(uri) if uri != "/" => router.rebase(uri)?,
            _ => router,
        };
        let router = Arc::new(router);
        self.registry.register(router.clone());
        Ok(router)
    }

    pub fn set(&self, key: &str, value: impl Into<Setting>) -> Result<&Self> {
        self.settings.set(key, value)?;
        Ok(self)
    }

    pub fn setting(&self, key: &str) -> Option<Setting> {
        self.settings.get(key)
    }

    /// Refresh the transport, settings and metrics switch from a reloaded
    /// configuration.
    pub fn apply_config(&self, config: &AppConfig) -> Result<()> {
        apply_config(&self.settings, config)
    }

    /// Apply every valid version of `path` as it changes on disk.
    ///
    /// Must be called from within a tokio runtime. Reloading stops once the
    /// returned handle is dropped.
    pub fn watch_config(&self, path: &Path) -> Result<RecommendedWatcher> {
        let (watcher, mut updates) = ConfigWatcher::new(path);
        let handle = watcher.run()?;
        let settings = self.settings.clone();
        tokio::spawn(async move {
            while let Some(config) = updates.recv().await {
                if let Err(e) = apply_config(&settings, &config) {
                    tracing::error!(error = %e, "Failed to apply reloaded config");
                }
            }
        });
        Ok(handle)
    }

    /// Start a page lifetime; `on_ready` runs once the page is interactive.
    pub fn listen<F>(&self, on_ready: F) -> &Self
    where
        F: FnOnce(&Request, &Response) + Send + 'static,
    {
        self.navigator.listen(Some(Box::new(on_ready)));
        self
    }

    pub fn handle_signal(&self, signal: HostSignal) -> Result<()> {
        self.navigator.handle(signal)
    }

    pub fn http_get(&self, input: impl Into<RequestOptions>) -> Submission<'_> {
        self.submission(Method::Get, input.into())
    }

    pub fn http_post(&self, input: impl Into<RequestOptions>) -> Submission<'_> {
        self.submission(Method::Post, input.into())
    }

    pub fn http_put(&self, input: impl Into<RequestOptions>) -> Submission<'_> {
        self.submission(Method::Put, input.into())
    }

    pub fn http_patch(&self, input: impl Into<RequestOptions>) -> Submission<'_> {
        self.submission(Method::Patch, input.into())
    }

    pub fn http_delete(&self, input: impl Into<RequestOptions>) -> Submission<'_> {
        self.submission(Method::Delete, input.into())
    }

    /// Submission for an arbitrary verb.
    pub fn submission(&self, method: Method, options: RequestOptions) -> Submission<'_> {
        Submission {
            pipeline: &self.pipeline,
            request: options.into_request(method),
            callbacks: Callbacks::new(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routers", &self.registry.len())
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

/// A request waiting to be sent.
#[must_use = "a submission does nothing until `send` is awaited"]
pub struct Submission<'a> {
    pipeline: &'a RequestPipeline,
    request: Request,
    callbacks: Callbacks,
}

impl Submission<'_> {
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Request, &Response) + Send + 'static,
    {
        self.callbacks = self.callbacks.on_success(f);
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Request, &Response) + Send + 'static,
    {
        self.callbacks = self.callbacks.on_failure(f);
        self
    }

    pub async fn send(self) -> Result<Completion> {
        self.pipeline.submit(self.request, self.callbacks).await
    }
}

fn apply_config(settings: &Settings, config: &AppConfig) -> Result<()> {
    settings.apply_config(config)?;
    metrics::set_enabled(config.observability.metrics_enabled);
    tracing::info!("Configuration applied");
    Ok(())
}
