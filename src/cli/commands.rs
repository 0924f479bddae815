//! CLI command implementations
//!
//! Every command except `operations` loads the configuration first; a
//! missing API key stops startup before any request is served.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::client::{HttpTransport, RemoteClient};
use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, Logger, MetricsRegistry};
use crate::registry::OperationRegistry;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::serve_lines;

/// Parse process arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Stdio => stdio(config_path),
        Command::Serve { port } => serve(config_path, port),
        Command::Operations => operations(),
        Command::Call { name, arguments } => call(config_path, &name, arguments.as_deref()),
    }
}

/// Load configuration and apply its log level
fn load_config(path: Option<&Path>) -> CliResult<GatewayConfig> {
    log_event(Event::BootStart);

    let config = GatewayConfig::load(path).map_err(|e| {
        log_event_with_fields(Event::ConfigInvalid, &[("reason", &e.to_string())]);
        CliError::from(e)
    })?;
    Logger::set_min_severity(config.log_level);

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("api_version", config.api_version.as_str()),
            ("base_url", config.base_url.as_str()),
        ],
    );
    Ok(config)
}

/// Wire transport, client and dispatcher from a resolved config
pub fn build_dispatcher(config: &GatewayConfig) -> CliResult<Dispatcher> {
    let transport = HttpTransport::new(&config.base_url, &config.api_version, &config.api_key)
        .map_err(|e| CliError::boot_failed(e.to_string()))?;
    let metrics = Arc::new(MetricsRegistry::new());
    let client = RemoteClient::new(Arc::new(transport), Arc::clone(&metrics));

    Ok(Dispatcher::new(
        Arc::new(OperationRegistry::standard()),
        client,
        metrics,
    ))
}

fn current_thread_runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Serve JSON-RPC on stdin/stdout until EOF
pub fn stdio(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let dispatcher = build_dispatcher(&config)?;
    log_event_with_fields(Event::BootComplete, &[("mode", "stdio")]);

    let rt = current_thread_runtime()?;
    rt.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        serve_lines(&dispatcher, stdin, tokio::io::stdout()).await
    })?;

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Serve the gateway over HTTP
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let dispatcher = build_dispatcher(&config)?;

    let mut http_config = config.http.clone();
    if let Some(port) = port {
        http_config.port = port;
    }
    let server = HttpServer::with_config(http_config, Arc::new(dispatcher));
    log_event_with_fields(Event::BootComplete, &[("mode", "http")]);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Print the operation registry; needs no credentials
pub fn operations() -> CliResult<()> {
    let registry = OperationRegistry::standard();
    let json = serde_json::to_string_pretty(registry.list())?;
    println!("{}", json);
    Ok(())
}

/// Parse the `--args` value into an argument bag
pub fn parse_call_arguments(raw: Option<&str>) -> CliResult<Option<Value>> {
    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| CliError::invalid_arguments(format!("--args is not valid JSON: {}", e))),
    }
}

/// Dispatch one operation and print its content envelope
pub fn call(config_path: Option<&Path>, name: &str, raw_arguments: Option<&str>) -> CliResult<()> {
    let arguments = parse_call_arguments(raw_arguments)?;
    let config = load_config(config_path)?;
    let dispatcher = build_dispatcher(&config)?;

    let rt = current_thread_runtime()?;
    let envelope = rt.block_on(dispatcher.dispatch(name, arguments));

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
