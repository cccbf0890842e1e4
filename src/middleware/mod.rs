//! Middleware lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Phase (entered / updated / failed / exited)
//!     → dispatcher.rs (walk routes in registry order)
//!     → types.rs (Middleware::invoke → Flow)
//!     → Flow::Halt stops the pass; Flow::Proceed continues
//! ```
//!
//! # Design Decisions
//! - Middleware is a tagged variant: hook object or plain function
//! - One explicit `Flow` return replaces any implicit continuation signal
//! - Hooks are synchronous; suspension only happens around the transport

pub mod dispatcher;
pub mod trace;
mod types;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use trace::TraceMiddleware;
pub use types::{Flow, HookResult, Lifecycle, Middleware, Phase};
