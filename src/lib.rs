//! honeycomb-gateway - Honeycomb API operations as callable, schema-described tools
//!
//! Layers, bottom-up:
//! - query: query specification model
//! - client: remote client for the Honeycomb REST API
//! - registry: operation catalog with input schemas
//! - dispatch: name + argument bag to one remote call, wrapped in an envelope
//! - cli / http_server: the surfaces that feed the dispatcher

pub mod cli;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod registry;
