//! CLI module for the gateway
//!
//! Provides command-line interface for:
//! - stdio: JSON-RPC session on stdin/stdout
//! - serve: HTTP surface
//! - operations: print the registry
//! - call: one-shot dispatch

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_dispatcher, call, operations, run, run_command, serve, stdio};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{serve_lines, StdioSession};
