//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! submit(request)
//!     → per-verb transformer (settings)
//!     → exited over the visited set
//!     → active route snapshot → entered
//!     → transport (the only await point)
//!     → completed: history push → updated → on_success
//!     → failed: failed → on_failure
//! ```
//!
//! # Design Decisions
//! - The route snapshot taken before the transport call is never re-queried
//! - No retries
//! - Transport failures are outcomes, not errors

mod submit;

pub use submit::{Callbacks, Completion, RequestPipeline, ResponseCallback};
