//! Route lookup.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up every route active for a URI + verb
//! - Report routes still holding a visited request
//!
//! # Design Decisions
//! - Copy-on-write route list (`ArcSwap`): lookups never block registration
//! - Every matching route is returned, in registration order
//! - An optional base URI is prefixed to every pattern

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::{Error, Result};
use crate::http::request::Method;
use crate::middleware::Middleware;
use crate::routing::matcher::{join_paths, ExactMatcher, PrefixMatcher};
use crate::routing::route::{ActiveRoute, Route};

/// Source of route matches, queried by the registry.
pub trait Router: Send + Sync {
    /// Every route active for `uri` + `method`, in match order.
    fn active_matches(&self, uri: &str, method: Method) -> Vec<ActiveRoute>;

    /// Every route whose visited slot is non-empty.
    fn visited(&self) -> Vec<Arc<Route>>;
}

/// Router matching segment patterns.
#[derive(Debug)]
pub struct PathRouter {
    base: String,
    routes: ArcSwap<Vec<Arc<Route>>>,
}

impl PathRouter {
    pub fn new() -> Self {
        Self::with_base("/")
    }

    /// Router whose patterns are all relative to `base`.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            routes: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }

    pub fn get(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.add_route(uri, Some(Method::Get), middleware.into())
    }

    pub fn post(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.add_route(uri, Some(Method::Post), middleware.into())
    }

    pub fn put(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.add_route(uri, Some(Method::Put), middleware.into())
    }

    pub fn patch(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.add_route(uri, Some(Method::Patch), middleware.into())
    }

    pub fn delete(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.add_route(uri, Some(Method::Delete), middleware.into())
    }

    /// Route matching `uri` exactly, for every verb.
    pub fn all(&self, uri: &str, middleware: impl Into<Middleware>) -> Result<&Self> {
        self.add_route(uri, None, middleware.into())
    }

    /// Route for `method`; `None` matches every verb.
    pub fn add_route(
        &self,
        uri: &str,
        method: Option<Method>,
        middleware: Middleware,
    ) -> Result<&Self> {
        check_uri(uri)?;
        let matcher = ExactMatcher::new(&join_paths(&self.base, uri))?;
        self.push(Route::new(Box::new(matcher), method, middleware));
        Ok(self)
    }

    /// Middleware active for every verb on `uri` and everything below it.
    pub fn use_middleware(&self, uri: Option<&str>, middleware: impl Into<Middleware>) -> Result<&Self> {
        let uri = uri.unwrap_or("/");
        check_uri(uri)?;
        let matcher = PrefixMatcher::new(&join_paths(&self.base, uri))?;
        self.push(Route::new(Box::new(matcher), None, middleware.into()));
        Ok(self)
    }

    /// Copy of this router's routes under a new base.
    ///
    /// Used when mounting a router at a URI.
    pub fn rebase(&self, base: &str) -> Result<Self> {
        let rebased = Self::with_base(join_paths(base, &self.base));
        for route in self.routes.load().iter() {
            let matcher = route.matcher().rebase(base)?;
            rebased.push(Route::new(matcher, route.method(), route.middleware().clone()));
        }
        Ok(rebased)
    }

    fn push(&self, route: Route) {
        let route = Arc::new(route);
        self.routes.rcu(|routes| {
            let mut next = Vec::clone(routes);
            next.push(route.clone());
            next
        });
        tracing::debug!(route = %route.label(), "Route registered");
    }
}

/// Registration URIs are absolute; joining with the base must not hide that.
fn check_uri(uri: &str) -> Result<()> {
    if uri.starts_with('/') {
        Ok(())
    } else {
        Err(Error::invalid(format!("route uri `{uri}` must start with `/`")))
    }
}

impl Default for PathRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for PathRouter {
    fn active_matches(&self, uri: &str, method: Method) -> Vec<ActiveRoute> {
        self.routes
            .load()
            .iter()
            .filter_map(|route| {
                route
                    .matches(uri, method)
                    .map(|params| ActiveRoute::new(route.clone(), params))
            })
            .collect()
    }

    fn visited(&self) -> Vec<Arc<Route>> {
        self.routes
            .load()
            .iter()
            .filter(|route| route.is_visited())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::middleware::Flow;

    fn noop() -> Middleware {
        Middleware::handler(|_, _| Ok(Flow::Proceed))
    }

    #[test]
    fn test_matches_in_registration_order() {
        let router = PathRouter::new();
        router.use_middleware(None, noop()).unwrap();
        router.get("/users/:id", noop()).unwrap();
        router.post("/users/:id", noop()).unwrap();
        router.all("/users/:id", noop()).unwrap();

        let active = router.active_matches("/users/9", Method::Get);
        let labels: Vec<String> = active.iter().map(|a| a.route.label()).collect();
        assert_eq!(labels, vec!["ALL /", "GET /users/:id", "ALL /users/:id"]);
        assert_eq!(active[1].params.get("id").map(String::as_str), Some("9"));
    }

    #[test]
    fn test_base_prefix() {
        let router = PathRouter::with_base("/api");
        router.get("/items", noop()).unwrap();

        assert_eq!(router.active_matches("/api/items", Method::Get).len(), 1);
        assert!(router.active_matches("/items", Method::Get).is_empty());
    }

    #[test]
    fn test_rebase_keeps_kinds_and_order() {
        let router = PathRouter::new();
        router.use_middleware(None, noop()).unwrap();
        router.get("/items", noop()).unwrap();

        let mounted = router.rebase("/shop").unwrap();
        assert_eq!(mounted.base(), "/shop");
        assert_eq!(mounted.active_matches("/shop/items", Method::Get).len(), 2);
        // Prefix route still matches below the mount point.
        assert_eq!(mounted.active_matches("/shop/cart", Method::Get).len(), 1);
        assert!(mounted.active_matches("/items", Method::Get).is_empty());
    }

    #[test]
    fn test_visited_lists_only_marked_routes() {
        let router = PathRouter::new();
        router.get("/a", noop()).unwrap();
        router.get("/b", noop()).unwrap();

        let active = router.active_matches("/b", Method::Get);
        active[0].route.mark_visited(Arc::new(Request::new(Method::Get, "/b")));

        let visited = router.visited();
        assert_eq!(visited.len(), 1);
        assert_eq!(visited[0].pattern(), "/b");
    }

    #[test]
    fn test_invalid_uri_rejected() {
        let router = PathRouter::with_base("/api");
        assert!(router.get("/:", noop()).is_err());
        assert!(router.get("items", noop()).is_err());
        assert!(router.get("", noop()).is_err());
        assert!(router.is_empty());
    }
}
