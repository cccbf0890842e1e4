//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check the base URL parses and header names are usable
//! - Keep reserved setting keys out of the free-form `[settings]` table
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use url::Url;

use crate::config::schema::AppConfig;
use crate::config::settings::is_reserved_key;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic rule, collecting all failures.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transport.timeout_secs",
            "must be greater than 0",
        ));
    }

    if let Some(base) = &config.transport.base_url {
        if let Err(e) = Url::parse(base) {
            errors.push(ValidationError::new(
                "transport.base_url",
                format!("`{base}` is not a valid URL ({e})"),
            ));
        }
    }

    for name in config.transport.default_headers.keys() {
        if name.trim().is_empty() || name.contains(|c: char| c.is_whitespace() || c == ':') {
            errors.push(ValidationError::new(
                "transport.default_headers",
                format!("`{name}` is not a valid header name"),
            ));
        }
    }

    if !config.navigation.initial_location.starts_with('/') {
        errors.push(ValidationError::new(
            "navigation.initial_location",
            "must start with `/`",
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }

    for key in config.settings.keys() {
        if is_reserved_key(key) {
            errors.push(ValidationError::new(
                format!("settings.{key}"),
                "reserved key cannot be set from a config file",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
