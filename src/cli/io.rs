//! JSON-RPC over stdio
//!
//! - Input: one JSON-RPC 2.0 frame per line on stdin
//! - Output: one response per request frame on stdout
//! - Frames without an `id` are notifications and get no response
//! - A bad frame yields an error response; the loop keeps going until EOF
//!
//! Dispatch failures are not JSON-RPC errors. They come back as a normal
//! result holding an error-shaped content envelope.

use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatch::Dispatcher;
use crate::observability::{log_event, log_event_with_fields, Event};

use super::errors::CliResult;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision announced when the client does not name one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "honeycomb-gateway";

/// JSON-RPC error codes
pub mod rpc_code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

fn success_frame(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result })
}

fn error_frame(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": { "code": error.code, "message": error.message }
    })
}

/// One stdio session bound to a dispatcher
pub struct StdioSession<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> StdioSession<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handle one frame; `None` when no response is due
    pub async fn handle_frame(&self, line: &str) -> Option<Value> {
        let frame: Value = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(e) => {
                log_event_with_fields(Event::StdioFrameRejected, &[("reason", &e.to_string())]);
                return Some(error_frame(
                    Value::Null,
                    RpcError::new(rpc_code::PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        let Value::Object(mut frame) = frame else {
            return Some(error_frame(
                Value::Null,
                RpcError::new(rpc_code::INVALID_REQUEST, "Request must be a JSON object"),
            ));
        };

        let id = frame.remove("id");
        let method = match frame.remove("method") {
            Some(Value::String(method)) => method,
            _ => {
                return id.map(|id| {
                    error_frame(
                        id,
                        RpcError::new(rpc_code::INVALID_REQUEST, "Missing method"),
                    )
                });
            }
        };
        let params = frame.remove("params");

        // Notifications (initialized, cancelled, ...) need no reply
        let id = id?;

        Some(match self.handle_method(&method, params).await {
            Ok(result) => success_frame(id, result),
            Err(error) => error_frame(id, error),
        })
    }

    async fn handle_method(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize(params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.dispatcher.registry().list() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::new(
                rpc_code::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Value {
        let protocol_version = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION)
            .to_string();

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let mut params: Map<String, Value> = match params {
            Some(Value::Object(map)) => map,
            _ => {
                return Err(RpcError::new(
                    rpc_code::INVALID_PARAMS,
                    "tools/call params must be an object",
                ))
            }
        };
        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(RpcError::new(
                    rpc_code::INVALID_PARAMS,
                    "tools/call requires a string name",
                ))
            }
        };

        let envelope = self
            .dispatcher
            .dispatch(&name, params.remove("arguments"))
            .await;
        serde_json::to_value(envelope)
            .map_err(|e| RpcError::new(rpc_code::INVALID_PARAMS, e.to_string()))
    }
}

/// Serve frames from `reader` until EOF, writing responses to `writer`
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> CliResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = StdioSession::new(dispatcher);
    let mut lines = reader.lines();
    log_event(Event::StdioSessionOpen);

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = session.handle_frame(&line).await {
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }

    log_event(Event::StdioSessionClosed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RawResponse, RemoteClient, StubTransport};
    use crate::observability::MetricsRegistry;
    use crate::registry::OperationRegistry;
    use std::sync::Arc;

    fn dispatcher(transport: Arc<StubTransport>) -> Dispatcher {
        let metrics = Arc::new(MetricsRegistry::new());
        let client = RemoteClient::new(transport, metrics.clone());
        Dispatcher::new(Arc::new(OperationRegistry::standard()), client, metrics)
    }

    async fn run(dispatcher: &Dispatcher, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve_lines(dispatcher, input.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let dispatcher = dispatcher(Arc::new(StubTransport::new()));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        );

        let responses = run(&dispatcher, input).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "honeycomb-gateway");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let dispatcher = dispatcher(Arc::new(StubTransport::new()));
        let responses = run(&dispatcher, r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#).await;

        let tools = responses[0]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 34);
        assert!(tools[2]["inputSchema"]["properties"]["datasetSlug"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_returns_envelope() {
        let transport = Arc::new(StubTransport::new());
        transport.respond(RawResponse::new(200, r#"{"name":"prod"}"#));
        let dispatcher = dispatcher(transport);

        let responses = run(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"honeycomb_dataset_get","arguments":{"datasetSlug":"prod"}}}"#,
        )
        .await;
        assert_eq!(responses[0]["id"], 7);
        assert_eq!(responses[0]["result"]["content"][0]["text"], r#"{"name":"prod"}"#);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_a_result_not_an_rpc_error() {
        let dispatcher = dispatcher(Arc::new(StubTransport::new()));
        let responses = run(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;
        assert!(responses[0].get("error").is_none());
        assert_eq!(
            responses[0]["result"]["content"][0]["text"],
            r#"{"error":"Unknown operation: nope"}"#
        );
    }

    #[tokio::test]
    async fn test_bad_frames_do_not_stop_the_loop() {
        let dispatcher = dispatcher(Arc::new(StubTransport::new()));
        let input = concat!(
            "{not json\n",
            "\n",
            "[1,2]\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"arguments":{}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":5}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#,
            "\n",
        );

        let responses = run(&dispatcher, input).await;
        let codes: Vec<_> = responses
            .iter()
            .map(|r| r["error"]["code"].as_i64())
            .collect();
        assert_eq!(
            codes,
            vec![
                Some(rpc_code::PARSE_ERROR),
                Some(rpc_code::INVALID_REQUEST),
                Some(rpc_code::METHOD_NOT_FOUND),
                Some(rpc_code::INVALID_PARAMS),
                Some(rpc_code::INVALID_REQUEST),
                None,
            ]
        );
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[5]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_empty_input_exits_cleanly() {
        let dispatcher = dispatcher(Arc::new(StubTransport::new()));
        assert!(run(&dispatcher, "").await.is_empty());
    }
}
