//! Request model.
//!
//! # Responsibilities
//! - Typed HTTP verbs and their string forms
//! - The request value passed through transformers, middleware and transport
//! - History directives attached to requests that should create an entry
//! - Request IDs used to correlate log events of one submission
//!
//! # Design Decisions
//! - A request is a plain value; rewriting produces a new one
//! - Params are filled per matched route, never by the caller

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Error;

/// Header map, ordered for stable logging.
pub type Headers = BTreeMap<String, String>;

/// Path parameters captured by a route pattern.
pub type Params = BTreeMap<String, String>;

/// HTTP verbs understood by routers and the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Every verb, in the order the public surface exposes them.
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid(format!("unknown method `{s}`")))
    }
}

/// Ask the pipeline to push a history entry once the request completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDirective {
    /// URI shown in the location bar; `None` keeps the current one.
    pub uri: Option<String>,
    pub title: Option<String>,
    /// Extra application state stored next to the request/response pair.
    pub state: Option<Value>,
}

/// A request travelling through the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub history: Option<HistoryDirective>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: Params,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Headers::new(),
            data: None,
            history: None,
            params: Params::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_history(mut self, history: HistoryDirective) -> Self {
        self.history = Some(history);
        self
    }

    /// Path portion of the URI, without query string or fragment.
    pub fn path(&self) -> &str {
        strip_query(&self.uri)
    }

    /// Copy of this request carrying the params of one matched route.
    pub(crate) fn with_params(&self, params: &Params) -> Self {
        let mut request = self.clone();
        request.params = params.clone();
        request
    }
}

pub(crate) fn strip_query(uri: &str) -> &str {
    let end = uri.find(['?', '#']).unwrap_or(uri.len());
    &uri[..end]
}

/// Caller-facing request description for the per-verb entry points.
///
/// The verb comes from the entry point, so it is not part of the options.
/// A bare URI converts into options with everything else empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub uri: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub history: Option<HistoryDirective>,
}

impl RequestOptions {
    pub fn into_request(self, method: Method) -> Request {
        Request {
            method,
            uri: self.uri,
            headers: self.headers,
            data: self.data,
            history: self.history,
            params: Params::new(),
        }
    }
}

impl From<&str> for RequestOptions {
    fn from(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            ..Default::default()
        }
    }
}

impl From<String> for RequestOptions {
    fn from(uri: String) -> Self {
        Self {
            uri,
            ..Default::default()
        }
    }
}

/// Unique identifier of one submission, used in log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
