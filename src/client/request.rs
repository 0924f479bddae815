//! Outbound request model
//!
//! A [`RemoteRequest`] is the transport-neutral description of exactly one
//! HTTP exchange: method, path segments below the versioned root, query
//! parameters and an already-serialized JSON body.

use std::fmt;

use serde::Serialize;

use super::errors::ClientResult;

/// HTTP method used against the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which datasets a marker operation applies to.
///
/// Callers spell environment-wide scope as the slug `"all"`; that
/// sentinel is translated here once and never travels further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetScope {
    AllDatasets,
    PerDataset(String),
}

impl DatasetScope {
    /// Slug callers use to mean "every dataset in the environment"
    pub const ALL_SENTINEL: &'static str = "all";

    pub fn from_slug(slug: &str) -> Self {
        if slug == Self::ALL_SENTINEL {
            DatasetScope::AllDatasets
        } else {
            DatasetScope::PerDataset(slug.to_string())
        }
    }

    /// Dataset filter for the query string, if any
    pub fn dataset(&self) -> Option<&str> {
        match self {
            DatasetScope::AllDatasets => None,
            DatasetScope::PerDataset(slug) => Some(slug),
        }
    }
}

/// One outbound request against the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub method: HttpMethod,
    /// Path segments below `{base_url}/{api_version}`, unencoded
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    /// Serialized JSON body for write operations
    pub body: Option<String>,
}

impl RemoteRequest {
    pub fn new(method: HttpMethod, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(HttpMethod::Get, segments)
    }

    pub fn post(segments: &[&str]) -> Self {
        Self::new(HttpMethod::Post, segments)
    }

    pub fn put(segments: &[&str]) -> Self {
        Self::new(HttpMethod::Put, segments)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(HttpMethod::Delete, segments)
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Append a query parameter when a value is present
    pub fn with_optional_query(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with_query(key, v.to_string()),
            None => self,
        }
    }

    /// Restrict the request to a dataset via `?dataset=` unless the scope
    /// covers every dataset.
    pub fn scoped(self, scope: &DatasetScope) -> Self {
        match scope.dataset() {
            Some(slug) => self.with_query("dataset", slug),
            None => self,
        }
    }

    /// Attach a JSON body, serialized once here
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// Path below the versioned root, for logs and assertions
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Value of the first query parameter named `key`
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
