//! Route matching logic.
//!
//! # Responsibilities
//! - Parse route patterns (`/users/:id`, `/files/*`)
//! - Match request paths, capturing params
//! - Exact matching for verb routes, prefix matching for `use` middleware
//!
//! # Design Decisions
//! - Matching is segment based; empty segments are ignored
//! - Literal segments are case-sensitive
//! - Query string and fragment never take part in matching
//! - No regex to guarantee O(n) matching

use std::fmt;

use crate::error::{Error, Result};
use crate::http::request::{strip_query, Params};

/// Trait for matching request paths against a route pattern.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns the captured params if `path` matches.
    fn matches(&self, path: &str) -> Option<Params>;

    /// The pattern this matcher was built from.
    fn pattern(&self) -> &str;

    /// Same kind of matcher with `base` prepended to its pattern.
    fn rebase(&self, base: &str) -> Result<Box<dyn Matcher>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern; it must start with `/`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(Error::invalid(format!(
                "route pattern `{raw}` must start with `/`"
            )));
        }

        let parts: Vec<&str> = segments(raw).collect();
        let mut out = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(Error::invalid(format!(
                        "route pattern `{raw}` has an unnamed parameter"
                    )));
                }
                Segment::Param(name.to_string())
            } else if *part == "*" {
                if i + 1 != parts.len() {
                    return Err(Error::invalid(format!(
                        "route pattern `{raw}` has `*` before the last segment"
                    )));
                }
                Segment::Wildcard
            } else {
                Segment::Literal(part.to_string())
            };
            out.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments: out,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match `path` segment by segment.
    ///
    /// With `prefix` set, extra trailing path segments are allowed.
    fn capture(&self, path: &str, prefix: bool) -> Option<Params> {
        let mut params = Params::new();
        let mut parts = segments(strip_query(path));

        for segment in &self.segments {
            match segment {
                Segment::Wildcard => return Some(params),
                Segment::Literal(lit) => {
                    if parts.next()? != lit.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), parts.next()?.to_string());
                }
            }
        }

        if prefix || parts.next().is_none() {
            Some(params)
        } else {
            None
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Join a router base and a route pattern into one pattern string.
pub fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    } else {
        format!("{base}/{path}")
    }
}

/// Matches the whole request path.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    pattern: PathPattern,
}

impl ExactMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
        })
    }
}

impl Matcher for ExactMatcher {
    fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.capture(path, false)
    }

    fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn rebase(&self, base: &str) -> Result<Box<dyn Matcher>> {
        Ok(Box::new(Self::new(&join_paths(base, self.pattern()))?))
    }
}

/// Matches any path below the pattern (mount semantics).
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    pattern: PathPattern,
}

impl PrefixMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
        })
    }
}

impl Matcher for PrefixMatcher {
    fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.capture(path, true)
    }

    fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn rebase(&self, base: &str) -> Result<Box<dyn Matcher>> {
        Ok(Box::new(Self::new(&join_paths(base, self.pattern()))?))
    }
}
