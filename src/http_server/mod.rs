//! # HTTP Server Module
//!
//! Exposes the dispatch gateway over HTTP with axum.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /metrics` - Dispatch counters
//! - `GET /operations` - Operation registry
//! - `POST /dispatch` - `{name, arguments}` to content envelope

pub mod config;
pub mod gateway_routes;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
