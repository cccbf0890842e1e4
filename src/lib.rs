//! Client-side routing core: route registry, middleware lifecycle, navigation
//! state machine and request pipeline.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod navigation;
pub mod observability;
pub mod pipeline;
pub mod replay;
pub mod routing;

pub use app::{App, Mount, Submission};
pub use config::AppConfig;
pub use error::{BoxError, Error, Result};
pub use http::{Method, Request, RequestOptions, Response};
pub use middleware::{Flow, Lifecycle, Middleware, Phase};
pub use navigation::{HostSignal, ReadyState};
pub use pipeline::Completion;
