//! Dispatcher
//!
//! Single entry point translating `(operation name, argument bag)` into a
//! content envelope. Stateless between calls: the registry is immutable and
//! the client holds only read-only configuration.
//!
//! Flow:
//! 1. Look up the operation
//! 2. Validate the argument bag against its required fields
//! 3. Decode into a typed call
//! 4. Execute exactly one remote request
//! 5. Wrap the outcome

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::client::RemoteClient;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};
use crate::registry::OperationRegistry;

use super::errors::{DispatchError, DispatchResult};
use super::request::{validate_arguments, OperationCall};
use super::response::ContentEnvelope;

/// Routes validated calls to the remote client
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
    client: RemoteClient,
    metrics: Arc<MetricsRegistry>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<OperationRegistry>,
        client: RemoteClient,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            registry,
            client,
            metrics,
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Shared handle for surfaces that report the counters
    pub fn metrics_handle(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    /// Dispatch and wrap the outcome; never fails
    pub async fn dispatch(&self, name: &str, arguments: Option<Value>) -> ContentEnvelope {
        ContentEnvelope::from_result(&self.call(name, arguments).await)
    }

    /// Dispatch and return the typed outcome
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> DispatchResult<Value> {
        let request_id = Uuid::new_v4().to_string();
        let scope = ObservationScope::with_fields(
            "DISPATCH",
            &[("operation", name), ("request_id", &request_id)],
        );
        self.metrics.increment_dispatches_received();

        match self.resolve(name, arguments) {
            Err(err) => {
                self.metrics.record_failure(err.failure_kind());
                scope.reject(&err.to_string());
                Err(err)
            }
            Ok(call) => match self.execute(call).await {
                Ok(value) => {
                    self.metrics.increment_dispatches_succeeded();
                    scope.complete();
                    Ok(value)
                }
                Err(err) => {
                    let err = DispatchError::from(err);
                    self.metrics.record_failure(err.failure_kind());
                    scope.fail(&err.to_string());
                    Err(err)
                }
            },
        }
    }

    /// Look up, validate and decode; no network I/O
    pub fn resolve(&self, name: &str, arguments: Option<Value>) -> DispatchResult<OperationCall> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))?;
        let kind = descriptor.kind();

        let bag = validate_arguments(kind, descriptor.input_shape(), arguments)?;
        let call = OperationCall::decode(kind, bag)?;

        if let Some(query) = call.query() {
            if !query.granularity_in_bounds() {
                if let (Some(granularity), Some((min, max))) =
                    (query.granularity, query.granularity_bounds())
                {
                    log_event_with_fields(
                        Event::GranularityOutOfBounds,
                        &[
                            ("granularity", &granularity.to_string()),
                            ("max", &max.to_string()),
                            ("min", &min.to_string()),
                            ("operation", name),
                        ],
                    );
                }
            }
        }

        Ok(call)
    }

    async fn execute(&self, call: OperationCall) -> crate::client::ClientResult<Value> {
        let client = &self.client;

        match call {
            OperationCall::Auth => client.auth().await,

            OperationCall::DatasetsList => client.list_datasets().await,
            OperationCall::DatasetGet(args) => client.get_dataset(&args.dataset_slug).await,
            OperationCall::DatasetCreate(body) => client.create_dataset(&body).await,
            OperationCall::DatasetUpdate(args) => {
                client.update_dataset(&args.dataset_slug, &args.body).await
            }
            OperationCall::DatasetDelete(args) => client.delete_dataset(&args.dataset_slug).await,
            OperationCall::ColumnsList(args) => {
                client
                    .list_columns(&args.dataset_slug, args.key_name.as_deref())
                    .await
            }

            OperationCall::QueryCreate(args) => {
                client.create_query(&args.dataset_slug, &args.query).await
            }
            OperationCall::QueryGet(args) => {
                client.get_query(&args.dataset_slug, &args.query_id).await
            }
            OperationCall::QueryResultCreate(args) => {
                let request = args.options.resolve(args.query_id);
                client
                    .create_query_result(&args.dataset_slug, &request)
                    .await
            }
            OperationCall::QueryResultGet(args) => {
                client
                    .get_query_result(&args.dataset_slug, &args.query_result_id)
                    .await
            }
            OperationCall::DatasetDefinitionsList(args) => {
                client
                    .list_dataset_definitions(&args.dataset_slug, &args.page)
                    .await
            }

            OperationCall::EventCreate(args) => {
                client
                    .create_event(&args.dataset_slug, &Value::Object(args.event))
                    .await
            }
            OperationCall::EventsBatchCreate(args) => {
                client
                    .create_events_batch(&args.dataset_slug, &args.events)
                    .await
            }

            OperationCall::BoardsList => client.list_boards().await,
            OperationCall::BoardGet(args) => client.get_board(&args.board_id).await,
            OperationCall::BoardCreate(fields) => client.create_board(&fields.into_body()).await,
            OperationCall::BoardUpdate(args) => {
                client
                    .update_board(&args.board_id, &args.fields.into_body())
                    .await
            }
            OperationCall::BoardDelete(args) => client.delete_board(&args.board_id).await,

            OperationCall::MarkersList { scope } => client.list_markers(&scope).await,
            OperationCall::MarkerGet { scope, marker_id } => {
                client.get_marker(&scope, &marker_id).await
            }
            OperationCall::MarkerCreate { scope, body } => {
                client.create_marker(&scope, &body).await
            }
            OperationCall::MarkerUpdate {
                scope,
                marker_id,
                body,
            } => client.update_marker(&scope, &marker_id, &body).await,
            OperationCall::MarkerDelete { scope, marker_id } => {
                client.delete_marker(&scope, &marker_id).await
            }

            OperationCall::SlosList(args) => client.list_slos(&args.dataset_slug).await,
            OperationCall::SloGet(args) => client.get_slo(&args.slo_id).await,
            OperationCall::SloCreate(args) => {
                client.create_slo(&args.dataset_slug, &args.body).await
            }
            OperationCall::SloUpdate(args) => client.update_slo(&args.slo_id, &args.body).await,
            OperationCall::SloDelete(args) => client.delete_slo(&args.slo_id).await,

            OperationCall::TriggersList(args) => client.list_triggers(&args.dataset_slug).await,
            OperationCall::TriggerGet(args) => {
                client
                    .get_trigger(&args.dataset_slug, &args.trigger_id)
                    .await
            }
            OperationCall::TriggerCreate(args) => {
                client.create_trigger(&args.dataset_slug, &args.body).await
            }
            OperationCall::TriggerUpdate(args) => {
                client
                    .update_trigger(&args.dataset_slug, &args.trigger_id, &args.body)
                    .await
            }
            OperationCall::TriggerDelete(args) => {
                client
                    .delete_trigger(&args.dataset_slug, &args.trigger_id)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpMethod, RawResponse, StubTransport};
    use serde_json::json;

    fn setup() -> (Dispatcher, Arc<StubTransport>) {
        let transport = Arc::new(StubTransport::new());
        let metrics = Arc::new(MetricsRegistry::new());
        let client = RemoteClient::new(transport.clone(), metrics.clone());
        let dispatcher = Dispatcher::new(Arc::new(OperationRegistry::standard()), client, metrics);
        (dispatcher, transport)
    }

    #[tokio::test]
    async fn test_unknown_operation_envelope() {
        let (dispatcher, transport) = setup();
        let envelope = dispatcher.dispatch("honeycomb_frobnicate", Some(json!({}))).await;

        assert_eq!(
            envelope.error_message().as_deref(),
            Some("Unknown operation: honeycomb_frobnicate")
        );
        assert!(transport.requests().is_empty());
        assert_eq!(dispatcher.metrics().snapshot().unknown_operations, 1);
    }

    #[tokio::test]
    async fn test_unknown_operation_without_arguments() {
        let (dispatcher, _) = setup();
        let err = dispatcher.call("nope", None).await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_OPERATION");
    }

    #[tokio::test]
    async fn test_missing_arguments_rejected_before_remote_call() {
        let (dispatcher, transport) = setup();
        let err = dispatcher.call("honeycomb_query_get", None).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = dispatcher
            .call("honeycomb_query_get", Some(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field(s): datasetSlug, queryId");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_success_passes_body_through() {
        let (dispatcher, transport) = setup();
        transport.respond(RawResponse::new(200, r#"{"team":{"slug":"acme"}}"#));

        let envelope = dispatcher.dispatch("honeycomb_auth", None).await;
        assert_eq!(envelope.payload(), Some(json!({"team": {"slug": "acme"}})));

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path(), "/auth");

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.dispatches_received, 1);
        assert_eq!(snapshot.dispatches_succeeded, 1);
        assert_eq!(snapshot.remote_calls, 1);
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_error_payload() {
        let (dispatcher, transport) = setup();
        transport.respond(RawResponse::new(404, r#"{"error":"dataset not found"}"#));

        let envelope = dispatcher
            .dispatch("honeycomb_dataset_get", Some(json!({"datasetSlug": "gone"})))
            .await;
        assert_eq!(
            envelope.error_message().as_deref(),
            Some(r#"Failed to get dataset: 404 Not Found ({"error":"dataset not found"})"#)
        );
        assert_eq!(dispatcher.metrics().snapshot().remote_errors, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_error_payload() {
        let (dispatcher, transport) = setup();
        transport.fail("connection refused");

        let err = dispatcher.call("honeycomb_boards_list", None).await.unwrap_err();
        assert_eq!(err.code(), "TRANSPORT_ERROR");
        assert_eq!(err.to_string(), "Failed to list boards: connection refused");
    }

    #[tokio::test]
    async fn test_out_of_bounds_granularity_is_forwarded() {
        let (dispatcher, transport) = setup();
        let query =
            json!({"calculations": [{"op": "COUNT"}], "time_range": 3600, "granularity": 1});

        dispatcher
            .call(
                "honeycomb_query_create",
                Some(json!({"datasetSlug": "prod", "query": query})),
            )
            .await
            .unwrap();

        let body: Value =
            serde_json::from_str(transport.last_request().unwrap().body.as_deref().unwrap())
                .unwrap();
        assert_eq!(body["granularity"], 1);
    }

    #[test]
    fn test_resolve_does_no_io() {
        let (dispatcher, transport) = setup();
        let call = dispatcher
            .resolve("honeycomb_slo_get", Some(json!({"sloId": "slo-1"})))
            .unwrap();
        assert!(matches!(call, OperationCall::SloGet(ref args) if args.slo_id == "slo-1"));
        assert!(transport.requests().is_empty());
    }
}
