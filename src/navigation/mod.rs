//! Navigation state machine.
//!
//! # Data Flow
//! ```text
//! Host signal (ready state, pop, unload)
//!     → machine.rs (phase guard, route lookup)
//!     → Dispatcher (entered / updated / exited)
//!     → ready callback (once per page lifetime)
//! ```
//!
//! # Design Decisions
//! - The load phase is a single atomic that only moves forward
//! - Signals may repeat; guards make them idempotent
//! - History entries carry the request/response pair that produced them

pub mod history;
pub mod machine;
pub mod signal;
mod state;

pub use history::{History, HistoryEntry, HistoryState, MemoryHistory};
pub use machine::{Navigator, ReadyCallback};
pub use signal::{HostSignal, ReadyState};
pub use state::LoadPhase;
