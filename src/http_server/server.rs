//! # HTTP Server
//!
//! Combines the gateway and observability routers behind one CORS layer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::dispatch::Dispatcher;
use crate::observability::{log_event_with_fields, Event, Logger};

use super::config::HttpServerConfig;
use super::gateway_routes::gateway_routes;
use super::observability_routes::observability_routes;

/// HTTP surface for the dispatch gateway
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let router = Self::build_router(&config, dispatcher);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, dispatcher: Arc<Dispatcher>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        Logger::warn("CORS_ORIGIN_IGNORED", &[("origin", origin.as_str())]);
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let metrics = dispatcher.metrics_handle();

        Router::new()
            .merge(observability_routes(metrics))
            .merge(gateway_routes(dispatcher))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", &bound)]);

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RawResponse, RemoteClient, StubTransport};
    use crate::observability::MetricsRegistry;
    use crate::registry::OperationRegistry;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server(transport: Arc<StubTransport>) -> HttpServer {
        let metrics = Arc::new(MetricsRegistry::new());
        let client = RemoteClient::new(transport, metrics.clone());
        let dispatcher = Dispatcher::new(Arc::new(OperationRegistry::standard()), client, metrics);
        HttpServer::with_config(HttpServerConfig::with_port(0), Arc::new(dispatcher))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = server(Arc::new(StubTransport::new()));
        assert_eq!(server.socket_addr(), "127.0.0.1:0");
    }

    #[tokio::test]
    async fn test_health() {
        let router = server(Arc::new(StubTransport::new())).router();
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_operations_listing() {
        let router = server(Arc::new(StubTransport::new())).router();
        let response = router
            .oneshot(Request::builder().uri("/operations").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        let operations = body["operations"].as_array().unwrap();
        assert_eq!(operations.len(), 34);
        assert_eq!(operations[0]["name"], "honeycomb_auth");
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let transport = Arc::new(StubTransport::new());
        transport.respond(RawResponse::new(200, r#"[{"slug":"prod"}]"#));
        let router = server(transport.clone()).router();

        let response = router
            .oneshot(post_json(
                "/dispatch",
                r#"{"name":"honeycomb_datasets_list","arguments":{}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["content"][0]["type"], "text");
        assert_eq!(body["content"][0]["text"], r#"[{"slug":"prod"}]"#);
        assert_eq!(transport.last_request().unwrap().path(), "/datasets");
    }

    #[tokio::test]
    async fn test_dispatch_errors_are_http_200() {
        let router = server(Arc::new(StubTransport::new())).router();

        let response = router
            .clone()
            .oneshot(post_json("/dispatch", r#"{"name":"honeycomb_board_get","arguments":{}}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_json(response).await["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({"error": "Missing required field(s): boardId"})
        );

        let response = router.oneshot(post_json("/dispatch", "not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_json(response).await["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(text.contains("Invalid dispatch request"));
    }

    #[tokio::test]
    async fn test_metrics_reflect_dispatches() {
        let router = server(Arc::new(StubTransport::new())).router();
        router
            .clone()
            .oneshot(post_json("/dispatch", r#"{"name":"nope"}"#))
            .await
            .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["dispatches_received"], 1);
        assert_eq!(body["unknown_operations"], 1);
    }
}
