//! HTTP-facing models and collaborators.
//!
//! # Data Flow
//! ```text
//! Caller input (bare URI or RequestOptions)
//!     → request.rs (typed Request)
//!     → transformer.rs (per-verb uri/headers/data rewrite)
//!     → [lifecycle: exited, match, entered]
//!     → transport.rs (fetch, classify 2xx vs failure)
//!     → response.rs (Response handed to updated/failed)
//! ```

pub mod request;
pub mod response;
pub mod transformer;
pub mod transport;

pub use request::{Headers, HistoryDirective, Method, Params, Request, RequestId, RequestOptions};
pub use response::Response;
pub use transformer::{query_string_transformer, Transformer};
pub use transport::{HttpTransport, Transport, TransportError};
