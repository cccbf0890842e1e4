//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → settings.rs (transport + free-form values in the settings store)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → App::watch_config applies it like App::apply_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Settings may also be changed at runtime through `App::set`

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, NavigationConfig, ObservabilityConfig, TransportConfig};
pub use settings::{Setting, Settings, TRANSPORT_KEY};
pub use watcher::ConfigWatcher;
