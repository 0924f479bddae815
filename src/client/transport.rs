//! Transport seam between the remote client and the network
//!
//! [`HttpTransport`] talks to the real API with `reqwest`. The
//! authentication and content-type headers are fixed when the transport is
//! built and shared read-only by every request. [`StubTransport`] records
//! requests and replays canned responses for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};

use super::errors::{ClientError, ClientResult, TransportFailure};
use super::request::{HttpMethod, RemoteRequest};

/// Header carrying the team API key (`X-Honeycomb-Team`)
pub const API_KEY_HEADER: &str = "x-honeycomb-team";

/// Raw response as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// Executes one request and returns the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &RemoteRequest) -> Result<RawResponse, TransportFailure>;
}

/// HTTPS transport against `{base_url}/{api_version}`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    root: Url,
}

impl HttpTransport {
    /// Build the transport, fixing the auth and content-type headers.
    pub fn new(base_url: &str, api_version: &str, api_key: &str) -> ClientResult<Self> {
        let mut root = Url::parse(base_url).map_err(|e| {
            ClientError::Configuration(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        root.path_segments_mut()
            .map_err(|_| {
                ClientError::Configuration(format!("base URL '{}' cannot carry a path", base_url))
            })?
            .pop_if_empty()
            .push(api_version);

        let mut key = HeaderValue::from_str(api_key).map_err(|_| {
            ClientError::Configuration("API key is not a valid header value".to_string())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self { http_client, root })
    }

    /// Full URL for a request, with segments percent-encoded
    pub fn url_for(&self, request: &RemoteRequest) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(request.segments.iter());
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        url
    }
}

/// `error: cause: cause` down the source chain
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &RemoteRequest) -> Result<RawResponse, TransportFailure> {
        let url = self.url_for(request);
        let mut builder = self
            .http_client
            .request(to_reqwest_method(request.method), url);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure(error_chain(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure(error_chain(&e)))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

/// In-memory transport: records every request and answers from a queue of
/// canned responses, falling back to `200 {}` once the queue is empty.
#[derive(Debug, Default)]
pub struct StubTransport {
    requests: Mutex<Vec<RemoteRequest>>,
    responses: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response
    pub fn respond(&self, response: RawResponse) -> &Self {
        self.lock_responses().push_back(Ok(response));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.lock_responses()
            .push_back(Err(TransportFailure(message.into())));
        self
    }

    /// Requests seen so far, in order
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<RemoteRequest> {
        self.requests().pop()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<RawResponse, TransportFailure>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: &RemoteRequest) -> Result<RawResponse, TransportFailure> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "{}")))
    }
}
