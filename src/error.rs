//! Crate-wide error type.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::middleware::Phase;

/// Boxed error returned by middleware hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by registration, configuration and dispatch.
///
/// Transport failures are not represented here: they flow through the
/// `failed` phase and the caller's failure callback instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A registration or settings call received an unusable value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A middleware hook returned an error, aborting the rest of the pass.
    #[error("middleware `{route}` failed during {phase}: {source}")]
    Middleware {
        route: String,
        phase: Phase,
        #[source]
        source: BoxError,
    },

    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration file could not be watched.
    #[error("config watch failed: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
