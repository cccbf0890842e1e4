//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, navigator, pipeline produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log output (stdout via fmt layer)
//!     → Whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging with `tracing` fields, not formatted strings
//! - Each submission runs inside a span carrying its request ID
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
