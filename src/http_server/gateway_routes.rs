//! Gateway HTTP Routes
//!
//! Discovery and dispatch over HTTP. `POST /dispatch` always answers 200:
//! failures travel inside the content envelope, never as HTTP errors.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::{ContentEnvelope, DispatchError, Dispatcher};
use crate::registry::OperationDescriptor;

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct OperationsResponse<'a> {
    pub operations: &'a [OperationDescriptor],
}

// ==================
// Router
// ==================

pub fn gateway_routes(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/operations", get(list_operations_handler))
        .route("/dispatch", post(dispatch_handler))
        .with_state(dispatcher)
}

// ==================
// Handlers
// ==================

async fn list_operations_handler(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    let body = serde_json::to_value(OperationsResponse {
        operations: dispatcher.registry().list(),
    })
    .unwrap_or(Value::Null);
    (StatusCode::OK, Json(body))
}

async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let envelope = match payload {
        Ok(Json(request)) => dispatcher.dispatch(&request.name, request.arguments).await,
        Err(rejection) => ContentEnvelope::error(&DispatchError::validation(format!(
            "Invalid dispatch request: {}",
            rejection.body_text()
        ))),
    };
    (StatusCode::OK, Json(envelope))
}
