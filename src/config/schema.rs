//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an
//! application. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::Headers;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Default transport settings.
    pub transport: TransportConfig,

    /// Page-load navigation settings.
    pub navigation: NavigationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Free-form values copied into the settings store.
    pub settings: BTreeMap<String, serde_json::Value>,
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL relative request URIs are resolved against.
    pub base_url: Option<String>,

    /// Request timeout (total time for request/response) in seconds.
    pub timeout_secs: u64,

    /// Headers added to every request; request headers win on conflict.
    pub default_headers: Headers,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            default_headers: Headers::new(),
        }
    }
}

/// Navigation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Location reported by the host before the first navigation.
    pub initial_location: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            initial_location: "/".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record dispatch and submission counters.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
