//! Per-verb request transformers.
//!
//! A transformer rewrites a request's URI, headers and data before it is
//! matched against routers. Each rewrite is optional and they run in order
//! (uri, headers, data), each one seeing the result of the previous.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::form_urlencoded;

use crate::http::request::{Headers, Request};

type UriFn = dyn Fn(&Request) -> String + Send + Sync;
type HeadersFn = dyn Fn(&Request) -> Headers + Send + Sync;
type DataFn = dyn Fn(&Request) -> Option<Value> + Send + Sync;

/// A set of optional request rewrites.
#[derive(Clone, Default)]
pub struct Transformer {
    uri: Option<Arc<UriFn>>,
    headers: Option<Arc<HeadersFn>>,
    data: Option<Arc<DataFn>>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uri<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        self.uri = Some(Arc::new(f));
        self
    }

    pub fn headers<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> Headers + Send + Sync + 'static,
    {
        self.headers = Some(Arc::new(f));
        self
    }

    pub fn data<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> Option<Value> + Send + Sync + 'static,
    {
        self.data = Some(Arc::new(f));
        self
    }

    /// Apply the configured rewrites; absent ones leave the field unchanged.
    pub fn apply(&self, mut request: Request) -> Request {
        if let Some(f) = &self.uri {
            request.uri = f(&request);
        }
        if let Some(f) = &self.headers {
            request.headers = f(&request);
        }
        if let Some(f) = &self.data {
            request.data = f(&request);
        }
        request
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("uri", &self.uri.is_some())
            .field("headers", &self.headers.is_some())
            .field("data", &self.data.is_some())
            .finish()
    }
}

/// Default GET transformer: encodes object `data` into the query string.
pub fn query_string_transformer() -> Transformer {
    Transformer::new().uri(|request| append_query(&request.uri, request.data.as_ref()))
}

fn append_query(uri: &str, data: Option<&Value>) -> String {
    let Some(Value::Object(fields)) = data else {
        return uri.to_string();
    };
    if fields.is_empty() {
        return uri.to_string();
    }

    let (base, fragment) = match uri.find('#') {
        Some(idx) => uri.split_at(idx),
        None => (uri, ""),
    };

    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        match value {
            Value::String(s) => query.append_pair(key, s),
            Value::Null => query.append_pair(key, ""),
            other => query.append_pair(key, &other.to_string()),
        };
    }

    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{}{fragment}", query.finish())
}
