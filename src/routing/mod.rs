//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! URI + verb
//!     → registry.rs (ask every router, in registration order)
//!     → router.rs (scan routes, in registration order)
//!     → matcher.rs (segment match, capture params)
//!     → Return: ordered ActiveRoute list (possibly empty)
//!
//! Exit bookkeeping:
//!     registry.visited_routes()
//!     → every Route whose visited slot is set, across all routers
//! ```
//!
//! # Design Decisions
//! - Every match fires; there is no "first match wins"
//! - Registration order is precedence order
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always yields the same ordered list

pub mod matcher;
pub mod registry;
pub mod route;
pub mod router;

pub use matcher::{ExactMatcher, Matcher, PathPattern, PrefixMatcher};
pub use registry::RouterRegistry;
pub use route::{ActiveRoute, Route};
pub use router::{PathRouter, Router};
