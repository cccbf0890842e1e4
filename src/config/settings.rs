//! Per-key settings store.
//!
//! # Responsibilities
//! - Hold application settings by key (free-form values and collaborators)
//! - Provide typed access to the reserved keys the pipeline reads
//! - Reject values of the wrong shape for reserved keys
//!
//! # Reserved keys
//! - `http requester`: the transport
//! - `http <METHOD> transformer`: the per-verb request transformer
//!
//! # Design Decisions
//! - Concurrent map (`DashMap`): readers never wait for the whole store
//! - Defaults are installed at construction: an `HttpTransport` and the
//!   query-string GET transformer

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::config::schema::AppConfig;
use crate::error::{Error, Result};
use crate::http::{query_string_transformer, HttpTransport, Method, Transformer, Transport};

/// Key of the transport setting.
pub const TRANSPORT_KEY: &str = "http requester";

/// Key of the transformer setting for `method`.
pub fn transformer_key(method: Method) -> String {
    format!("http {method} transformer")
}

fn transformer_method(key: &str) -> Option<Method> {
    key.strip_prefix("http ")?
        .strip_suffix(" transformer")?
        .parse()
        .ok()
}

/// Whether `key` is reserved for a typed collaborator.
pub fn is_reserved_key(key: &str) -> bool {
    key == TRANSPORT_KEY || transformer_method(key).is_some()
}

/// A settings value.
#[derive(Clone)]
pub enum Setting {
    Value(Value),
    Transformer(Transformer),
    Transport(Arc<dyn Transport>),
}

impl Setting {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Setting::Value(v) => Some(v),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Setting::Value(_) => "value",
            Setting::Transformer(_) => "transformer",
            Setting::Transport(_) => "transport",
        }
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Setting::Transformer(t) => f.debug_tuple("Transformer").field(t).finish(),
            Setting::Transport(_) => f.write_str("Transport(..)"),
        }
    }
}

impl From<Value> for Setting {
    fn from(value: Value) -> Self {
        Setting::Value(value)
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Setting::Value(Value::String(value.to_string()))
    }
}

impl From<Transformer> for Setting {
    fn from(transformer: Transformer) -> Self {
        Setting::Transformer(transformer)
    }
}

impl From<Arc<dyn Transport>> for Setting {
    fn from(transport: Arc<dyn Transport>) -> Self {
        Setting::Transport(transport)
    }
}

impl From<HttpTransport> for Setting {
    fn from(transport: HttpTransport) -> Self {
        Setting::Transport(Arc::new(transport))
    }
}

/// Concurrent key/value settings.
#[derive(Debug)]
pub struct Settings {
    inner: DashMap<String, Setting>,
}

impl Settings {
    /// Store with the default transport and GET transformer.
    pub fn new() -> Self {
        let settings = Self::empty();
        settings
            .inner
            .insert(TRANSPORT_KEY.to_string(), HttpTransport::default().into());
        settings
            .inner
            .insert(transformer_key(Method::Get), query_string_transformer().into());
        settings
    }

    /// Store with no entries at all.
    pub fn empty() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Store built from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let settings = Self::new();
        settings.apply_config(config)?;
        Ok(settings)
    }

    /// Replace the transport and copy free-form values from `config`.
    pub fn apply_config(&self, config: &AppConfig) -> Result<()> {
        let transport = HttpTransport::new(&config.transport)
            .map_err(|e| Error::invalid(format!("transport configuration: {e}")))?;
        self.set(TRANSPORT_KEY, transport)?;
        for (key, value) in &config.settings {
            self.set(key, value.clone())?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Setting> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Insert or replace a setting, returning the previous one.
    pub fn set(&self, key: &str, value: impl Into<Setting>) -> Result<Option<Setting>> {
        let value = value.into();
        let expected = if key == TRANSPORT_KEY {
            Some("transport")
        } else if transformer_method(key).is_some() {
            Some("transformer")
        } else {
            None
        };
        if let Some(expected) = expected {
            if value.kind() != expected {
                return Err(Error::invalid(format!(
                    "setting `{key}` expects a {expected}, got a {}",
                    value.kind()
                )));
            }
        }

        tracing::debug!(key, kind = value.kind(), "Setting updated");
        Ok(self.inner.insert(key.to_string(), value))
    }

    pub fn remove(&self, key: &str) -> Option<Setting> {
        self.inner.remove(key).map(|(_, v)| v)
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.get(key).and_then(|s| s.as_value().cloned())
    }

    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        match self.get(TRANSPORT_KEY)? {
            Setting::Transport(t) => Some(t),
            _ => None,
        }
    }

    pub fn transformer(&self, method: Method) -> Option<Transformer> {
        match self.get(&transformer_key(method))? {
            Setting::Transformer(t) => Some(t),
            _ => None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_installed() {
        let settings = Settings::new();
        assert!(settings.transport().is_some());
        assert!(settings.transformer(Method::Get).is_some());
        assert!(settings.transformer(Method::Post).is_none());
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key("http requester"));
        assert!(is_reserved_key("http PATCH transformer"));
        assert!(!is_reserved_key("http TRACE transformer"));
        assert!(!is_reserved_key("title"));
        assert_eq!(transformer_key(Method::Delete), "http DELETE transformer");
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let settings = Settings::new();
        assert!(matches!(
            settings.set(TRANSPORT_KEY, json!("curl")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            settings.set("http POST transformer", HttpTransport::default()),
            Err(Error::InvalidArgument(_))
        ));
        // The default survives a rejected write.
        assert!(settings.transport().is_some());
    }

    #[test]
    fn test_free_form_values() {
        let settings = Settings::empty();
        assert!(settings.set("title", "Demo").unwrap().is_none());
        let previous = settings.set("title", json!("Other")).unwrap();
        assert_eq!(previous.and_then(|p| p.as_value().cloned()), Some(json!("Demo")));
        assert_eq!(settings.value("title"), Some(json!("Other")));
        assert!(settings.remove("title").is_some());
        assert!(settings.value("title").is_none());
    }

    #[test]
    fn test_apply_config_copies_values() {
        let mut config = AppConfig::default();
        config.settings.insert("page_size".into(), json!(25));
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.value("page_size"), Some(json!(25)));
        assert!(settings.transport().is_some());
    }
}
