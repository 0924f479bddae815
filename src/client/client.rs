//! Remote API client
//!
//! One method per remote operation. Each method builds exactly one
//! [`RemoteRequest`], hands it to the transport and normalizes the outcome:
//! a success status yields the parsed JSON body unmodified, anything else
//! becomes a [`ClientError`].

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::observability::{Logger, MetricsRegistry};
use crate::query::{QueryResultRequest, ValidatedQuery};

use super::errors::{ClientError, ClientResult};
use super::request::{DatasetScope, RemoteRequest};
use super::resources::{
    BoardBody, DatasetBody, DatasetBound, MarkerBody, PageOptions, SloBody, TriggerBody,
};
use super::transport::Transport;

/// Client for the remote observability API
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
    metrics: Arc<MetricsRegistry>,
}

impl RemoteClient {
    pub fn new(transport: Arc<dyn Transport>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { transport, metrics }
    }

    /// Execute one request and normalize the response
    async fn send(&self, action: &'static str, request: RemoteRequest) -> ClientResult<Value> {
        let started = Instant::now();
        let path = request.path();
        let method = request.method.as_str();
        self.metrics.increment_remote_calls();

        let response = self.transport.execute(&request).await.map_err(|e| {
            Logger::error(
                "REMOTE_TRANSPORT_FAILED",
                &[("action", action), ("method", method), ("path", &path), ("reason", &e.0)],
            );
            ClientError::Transport {
                action,
                message: e.0,
            }
        })?;

        let status = response.status.to_string();
        let elapsed_ms = started.elapsed().as_millis().to_string();
        Logger::trace(
            "REMOTE_RESPONSE",
            &[
                ("action", action),
                ("duration_ms", &elapsed_ms),
                ("method", method),
                ("path", &path),
                ("status", &status),
            ],
        );

        if !response.is_success() {
            let body = response.body.trim();
            return Err(ClientError::Remote {
                action,
                status: response.status,
                status_text: response.status_text,
                body: if body.is_empty() {
                    None
                } else {
                    Some(body.to_string())
                },
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response.body).map_err(|e| ClientError::InvalidResponse {
            action,
            message: e.to_string(),
        })
    }

    // ==================
    // Auth
    // ==================

    /// Validate the API key and describe its team and environment
    pub async fn auth(&self) -> ClientResult<Value> {
        self.send("validate API key", RemoteRequest::get(&["auth"])).await
    }

    // ==================
    // Datasets
    // ==================

    pub async fn list_datasets(&self) -> ClientResult<Value> {
        self.send("list datasets", RemoteRequest::get(&["datasets"])).await
    }

    pub async fn get_dataset(&self, slug: &str) -> ClientResult<Value> {
        self.send("get dataset", RemoteRequest::get(&["datasets", slug])).await
    }

    pub async fn create_dataset(&self, body: &DatasetBody) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["datasets"]).with_json(body)?;
        self.send("create dataset", request).await
    }

    pub async fn update_dataset(&self, slug: &str, body: &DatasetBody) -> ClientResult<Value> {
        let request = RemoteRequest::put(&["datasets", slug]).with_json(body)?;
        self.send("update dataset", request).await
    }

    pub async fn delete_dataset(&self, slug: &str) -> ClientResult<Value> {
        self.send("delete dataset", RemoteRequest::delete(&["datasets", slug])).await
    }

    /// Columns of a dataset, optionally narrowed to one key name
    pub async fn list_columns(&self, slug: &str, key_name: Option<&str>) -> ClientResult<Value> {
        let request =
            RemoteRequest::get(&["columns", slug]).with_optional_query("key_name", key_name);
        self.send("list columns", request).await
    }

    pub async fn list_dataset_definitions(
        &self,
        slug: &str,
        page: &PageOptions,
    ) -> ClientResult<Value> {
        let request = RemoteRequest::get(&["dataset_definitions", slug])
            .with_optional_query("page", page.page)
            .with_optional_query("page_size", page.page_size)
            .with_optional_query("sort_by", page.sort_by.as_deref())
            .with_optional_query("sort_order", page.sort_order.map(|o| o.as_str()));
        self.send("list dataset definitions", request).await
    }

    // ==================
    // Queries and results
    // ==================

    /// Save a query specification; the body is the caller's JSON verbatim
    pub async fn create_query(&self, slug: &str, query: &ValidatedQuery) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["queries", slug]).with_json(query.raw())?;
        self.send("create query", request).await
    }

    pub async fn get_query(&self, slug: &str, query_id: &str) -> ClientResult<Value> {
        self.send("get query", RemoteRequest::get(&["queries", slug, query_id])).await
    }

    /// Start running a saved query; returns a result handle to poll
    pub async fn create_query_result(
        &self,
        slug: &str,
        request: &QueryResultRequest,
    ) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["query_results", slug]).with_json(request)?;
        self.send("create query result", request).await
    }

    pub async fn get_query_result(&self, slug: &str, result_id: &str) -> ClientResult<Value> {
        self.send(
            "get query result",
            RemoteRequest::get(&["query_results", slug, result_id]),
        )
        .await
    }

    // ==================
    // Events
    // ==================

    pub async fn create_event(&self, slug: &str, event: &Value) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["events", slug]).with_json(event)?;
        self.send("create event", request).await
    }

    pub async fn create_events_batch(&self, slug: &str, events: &[Value]) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["batch", slug]).with_json(events)?;
        self.send("create event batch", request).await
    }

    // ==================
    // Boards
    // ==================

    pub async fn list_boards(&self) -> ClientResult<Value> {
        self.send("list boards", RemoteRequest::get(&["boards"])).await
    }

    pub async fn get_board(&self, board_id: &str) -> ClientResult<Value> {
        self.send("get board", RemoteRequest::get(&["boards", board_id])).await
    }

    pub async fn create_board(&self, body: &BoardBody) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["boards"]).with_json(body)?;
        self.send("create board", request).await
    }

    pub async fn update_board(&self, board_id: &str, body: &BoardBody) -> ClientResult<Value> {
        let request = RemoteRequest::put(&["boards", board_id]).with_json(body)?;
        self.send("update board", request).await
    }

    pub async fn delete_board(&self, board_id: &str) -> ClientResult<Value> {
        self.send("delete board", RemoteRequest::delete(&["boards", board_id])).await
    }

    // ==================
    // Markers
    // ==================

    pub async fn list_markers(&self, scope: &DatasetScope) -> ClientResult<Value> {
        self.send("list markers", RemoteRequest::get(&["markers"]).scoped(scope)).await
    }

    pub async fn get_marker(&self, scope: &DatasetScope, marker_id: &str) -> ClientResult<Value> {
        self.send(
            "get marker",
            RemoteRequest::get(&["markers", marker_id]).scoped(scope),
        )
        .await
    }

    pub async fn create_marker(
        &self,
        scope: &DatasetScope,
        body: &MarkerBody,
    ) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["markers"])
            .scoped(scope)
            .with_json(body)?;
        self.send("create marker", request).await
    }

    pub async fn update_marker(
        &self,
        scope: &DatasetScope,
        marker_id: &str,
        body: &MarkerBody,
    ) -> ClientResult<Value> {
        let request = RemoteRequest::put(&["markers", marker_id])
            .scoped(scope)
            .with_json(body)?;
        self.send("update marker", request).await
    }

    pub async fn delete_marker(
        &self,
        scope: &DatasetScope,
        marker_id: &str,
    ) -> ClientResult<Value> {
        self.send(
            "delete marker",
            RemoteRequest::delete(&["markers", marker_id]).scoped(scope),
        )
        .await
    }

    // ==================
    // SLOs
    // ==================

    pub async fn list_slos(&self, slug: &str) -> ClientResult<Value> {
        self.send(
            "list SLOs",
            RemoteRequest::get(&["slos"]).with_query("dataset", slug),
        )
        .await
    }

    pub async fn get_slo(&self, slo_id: &str) -> ClientResult<Value> {
        self.send("get SLO", RemoteRequest::get(&["slos", slo_id])).await
    }

    pub async fn create_slo(&self, slug: &str, body: &SloBody) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["slos"]).with_json(&DatasetBound {
            body,
            dataset: slug,
        })?;
        self.send("create SLO", request).await
    }

    pub async fn update_slo(&self, slo_id: &str, body: &SloBody) -> ClientResult<Value> {
        let request = RemoteRequest::put(&["slos", slo_id]).with_json(body)?;
        self.send("update SLO", request).await
    }

    pub async fn delete_slo(&self, slo_id: &str) -> ClientResult<Value> {
        self.send("delete SLO", RemoteRequest::delete(&["slos", slo_id])).await
    }

    // ==================
    // Triggers
    // ==================

    pub async fn list_triggers(&self, slug: &str) -> ClientResult<Value> {
        self.send(
            "list triggers",
            RemoteRequest::get(&["triggers"]).with_query("dataset", slug),
        )
        .await
    }

    pub async fn get_trigger(&self, slug: &str, trigger_id: &str) -> ClientResult<Value> {
        self.send(
            "get trigger",
            RemoteRequest::get(&["triggers", trigger_id]).with_query("dataset", slug),
        )
        .await
    }

    pub async fn create_trigger(&self, slug: &str, body: &TriggerBody) -> ClientResult<Value> {
        let request = RemoteRequest::post(&["triggers"]).with_json(&DatasetBound {
            body,
            dataset: slug,
        })?;
        self.send("create trigger", request).await
    }

    pub async fn update_trigger(
        &self,
        slug: &str,
        trigger_id: &str,
        body: &TriggerBody,
    ) -> ClientResult<Value> {
        let request = RemoteRequest::put(&["triggers", trigger_id]).with_json(&DatasetBound {
            body,
            dataset: slug,
        })?;
        self.send("update trigger", request).await
    }

    pub async fn delete_trigger(&self, slug: &str, trigger_id: &str) -> ClientResult<Value> {
        self.send(
            "delete trigger",
            RemoteRequest::delete(&["triggers", trigger_id]).with_query("dataset", slug),
        )
        .await
    }
}
