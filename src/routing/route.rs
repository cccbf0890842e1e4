//! Route descriptors.
//!
//! # Responsibilities
//! - Bind a matcher, an optional verb and a middleware together
//! - Hold the last request that visited the route
//!
//! # Design Decisions
//! - `visited` is lock-free (`ArcSwapOption`) so lookups never block
//! - Only the dispatcher writes `visited`

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::http::request::{Method, Params, Request};
use crate::middleware::Middleware;
use crate::routing::matcher::Matcher;

/// A registered (path, verb, middleware) binding.
pub struct Route {
    matcher: Box<dyn Matcher>,
    /// `None` matches every verb (`all` routes and `use` middleware).
    method: Option<Method>,
    middleware: Middleware,
    visited: ArcSwapOption<Request>,
}

impl Route {
    pub fn new(matcher: Box<dyn Matcher>, method: Option<Method>, middleware: Middleware) -> Self {
        Self {
            matcher,
            method,
            middleware,
            visited: ArcSwapOption::empty(),
        }
    }

    /// Returns the captured params if this route is active for `uri` + `method`.
    pub fn matches(&self, uri: &str, method: Method) -> Option<Params> {
        if self.method.is_some_and(|m| m != method) {
            return None;
        }
        self.matcher.matches(uri)
    }

    pub fn method(&self) -> Option<Method> {
        self.method
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// The request that last updated this route, if not yet exited.
    pub fn visited(&self) -> Option<Arc<Request>> {
        self.visited.load_full()
    }

    pub fn is_visited(&self) -> bool {
        self.visited.load().is_some()
    }

    pub(crate) fn mark_visited(&self, request: Arc<Request>) {
        self.visited.store(Some(request));
    }

    pub(crate) fn clear_visited(&self) {
        self.visited.store(None);
    }

    /// Label used in logs and errors, e.g. `GET /users/:id`.
    pub fn label(&self) -> String {
        match self.method {
            Some(method) => format!("{method} {}", self.pattern()),
            None => format!("ALL {}", self.pattern()),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern())
            .field("method", &self.method)
            .field("middleware", &self.middleware)
            .field("visited", &self.is_visited())
            .finish()
    }
}

/// A route paired with the params captured when it matched.
#[derive(Debug, Clone)]
pub struct ActiveRoute {
    pub route: Arc<Route>,
    pub params: Params,
}

impl ActiveRoute {
    pub fn new(route: Arc<Route>, params: Params) -> Self {
        Self { route, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Flow;
    use crate::routing::matcher::ExactMatcher;

    fn route(method: Option<Method>) -> Route {
        Route::new(
            Box::new(ExactMatcher::new("/a/:id").unwrap()),
            method,
            Middleware::handler(|_, _| Ok(Flow::Proceed)),
        )
    }

    #[test]
    fn test_method_filter() {
        let get = route(Some(Method::Get));
        assert!(get.matches("/a/1", Method::Get).is_some());
        assert!(get.matches("/a/1", Method::Post).is_none());

        let any = route(None);
        assert!(any.matches("/a/1", Method::Delete).is_some());
    }

    #[test]
    fn test_visited_slot() {
        let r = route(Some(Method::Get));
        assert!(!r.is_visited());

        r.mark_visited(Arc::new(Request::new(Method::Get, "/a/1")));
        assert_eq!(r.visited().unwrap().uri, "/a/1");

        r.clear_visited();
        assert!(r.visited().is_none());
    }

    #[test]
    fn test_label() {
        assert_eq!(route(Some(Method::Get)).label(), "GET /a/:id");
        assert_eq!(route(None).label(), "ALL /a/:id");
    }
}
