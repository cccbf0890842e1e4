//! Middleware lifecycle dispatcher.
//!
//! # Responsibilities
//! - Run one phase over an ordered route list, strictly sequentially
//! - Stop a pass at the first `Flow::Halt`
//! - Keep the visited bookkeeping: set on `updated`, cleared on `exited`
//!
//! # Design Decisions
//! - `visited` is set before the `updated` hook runs, whatever it returns
//! - `failed` never sets `visited`
//! - `exited` walks the registry's visited set, not a freshly matched one,
//!   and clears every slot it visits
//! - A hook error aborts the pass and is returned to the caller

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::middleware::types::{Flow, Phase};
use crate::observability::metrics;
use crate::routing::{ActiveRoute, RouterRegistry};

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub phase: Phase,
    /// Number of middleware invoked.
    pub invoked: usize,
    /// Index of the route that halted the pass, if any.
    pub halted_at: Option<usize>,
}

impl DispatchReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            invoked: 0,
            halted_at: None,
        }
    }

    pub fn halted(&self) -> bool {
        self.halted_at.is_some()
    }
}

/// Runs lifecycle phases against routes from one registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<RouterRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RouterRegistry> {
        &self.registry
    }

    /// Uniform entry point for every phase.
    ///
    /// `routes` and `response` are ignored by `exited`, which always runs over
    /// the registry's visited set. `entered` ignores `response`.
    pub fn dispatch(
        &self,
        phase: Phase,
        routes: &[ActiveRoute],
        request: &Request,
        response: &Response,
    ) -> Result<DispatchReport> {
        match phase {
            Phase::Exited => self.exited(),
            _ => self.run(phase, routes, request, response),
        }
    }

    pub fn entered(&self, routes: &[ActiveRoute], request: &Request) -> Result<DispatchReport> {
        self.run(Phase::Entered, routes, request, &Response::default())
    }

    pub fn updated(
        &self,
        routes: &[ActiveRoute],
        request: &Request,
        response: &Response,
    ) -> Result<DispatchReport> {
        self.run(Phase::Updated, routes, request, response)
    }

    pub fn failed(
        &self,
        routes: &[ActiveRoute],
        request: &Request,
        response: &Response,
    ) -> Result<DispatchReport> {
        self.run(Phase::Failed, routes, request, response)
    }

    /// Retire every visited route.
    pub fn exited(&self) -> Result<DispatchReport> {
        let mut report = DispatchReport::new(Phase::Exited);
        let visited = self.registry.visited_routes();
        tracing::debug!(routes = visited.len(), "Dispatching exited");

        for route in visited {
            // Another pass may have cleared it since the registry was read.
            let Some(request) = route.visited() else {
                continue;
            };
            tracing::trace!(route = %route.label(), middleware = route.middleware().name(), "exited");
            report.invoked += 1;
            route
                .middleware()
                .invoke(Phase::Exited, &request, &Response::default())
                .map_err(|source| Error::Middleware {
                    route: route.label(),
                    phase: Phase::Exited,
                    source,
                })?;
            route.clear_visited();
        }

        metrics::record_dispatch(&report);
        Ok(report)
    }

    fn run(
        &self,
        phase: Phase,
        routes: &[ActiveRoute],
        request: &Request,
        response: &Response,
    ) -> Result<DispatchReport> {
        let mut report = DispatchReport::new(phase);
        tracing::debug!(%phase, routes = routes.len(), uri = %request.uri, "Dispatching");

        for (index, active) in routes.iter().enumerate() {
            let route = &active.route;
            let request: Cow<'_, Request> = if active.params.is_empty() {
                Cow::Borrowed(request)
            } else {
                Cow::Owned(request.with_params(&active.params))
            };

            if phase == Phase::Updated {
                route.mark_visited(Arc::new(request.clone().into_owned()));
            }

            tracing::trace!(%phase, route = %route.label(), middleware = route.middleware().name(), "invoke");
            report.invoked += 1;
            let flow = route
                .middleware()
                .invoke(phase, &request, response)
                .map_err(|source| Error::Middleware {
                    route: route.label(),
                    phase,
                    source,
                })?;

            if flow == Flow::Halt {
                tracing::debug!(%phase, route = %route.label(), "Middleware halted the chain");
                report.halted_at = Some(index);
                break;
            }
        }

        metrics::record_dispatch(&report);
        Ok(report)
    }
}
