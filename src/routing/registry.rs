//! Ordered router registry.
//!
//! Registration order is the precedence contract: the first registered
//! router's matches are invoked first. Duplicates are never filtered, so the
//! same path may fire both a verb-agnostic and a verb-specific middleware.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::http::request::Method;
use crate::routing::route::{ActiveRoute, Route};
use crate::routing::router::Router;

/// Every router known to an application, in registration order.
pub struct RouterRegistry {
    routers: ArcSwap<Vec<Arc<dyn Router>>>,
}

impl RouterRegistry {
    pub fn new() -> Self {
        Self {
            routers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a router; it takes precedence after every existing one.
    pub fn register(&self, router: Arc<dyn Router>) {
        self.routers.rcu(|routers| {
            let mut next = Vec::clone(routers);
            next.push(router.clone());
            next
        });
    }

    pub fn len(&self) -> usize {
        self.routers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.load().is_empty()
    }

    /// Routes active for `uri` + `method`: router order, then match order.
    pub fn active_routes(&self, uri: &str, method: Method) -> Vec<ActiveRoute> {
        self.routers
            .load()
            .iter()
            .flat_map(|router| router.active_matches(uri, method))
            .collect()
    }

    /// Routes currently holding a visited request, independent of any URI.
    pub fn visited_routes(&self) -> Vec<Arc<Route>> {
        self.routers
            .load()
            .iter()
            .flat_map(|router| router.visited())
            .collect()
    }
}

impl Default for RouterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::middleware::{Flow, Middleware};
    use crate::routing::router::PathRouter;

    fn noop() -> Middleware {
        Middleware::handler(|_, _| Ok(Flow::Proceed))
    }

    #[test]
    fn test_concatenates_in_router_order() {
        let registry = RouterRegistry::new();

        let verbs = PathRouter::new();
        verbs.get("/a", noop()).unwrap();
        let any = PathRouter::new();
        any.use_middleware(None, noop()).unwrap();

        registry.register(Arc::new(verbs));
        registry.register(Arc::new(any));

        let labels: Vec<String> = registry
            .active_routes("/a", Method::Get)
            .iter()
            .map(|a| a.route.label())
            .collect();
        assert_eq!(labels, vec!["GET /a", "ALL /"]);

        // Only the verb-agnostic router matches a POST.
        assert_eq!(registry.active_routes("/a", Method::Post).len(), 1);
    }

    #[test]
    fn test_visited_routes_ignore_uri() {
        let registry = RouterRegistry::new();
        let router = Arc::new(PathRouter::new());
        router.get("/a", noop()).unwrap();
        router.get("/b", noop()).unwrap();
        registry.register(router.clone());

        assert!(registry.visited_routes().is_empty());

        for active in registry.active_routes("/a", Method::Get) {
            active.route.mark_visited(Arc::new(Request::new(Method::Get, "/a")));
        }
        let visited = registry.visited_routes();
        assert_eq!(visited.len(), 1);
        assert_eq!(visited[0].pattern(), "/a");
    }
}
