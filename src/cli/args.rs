//! CLI argument definitions using clap
//!
//! Commands:
//! - honeycomb-gateway stdio [--config <path>]
//! - honeycomb-gateway serve [--config <path>] [--port <port>]
//! - honeycomb-gateway operations
//! - honeycomb-gateway call <name> [--args <json>] [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Honeycomb API operations exposed as callable, schema-described tools
#[derive(Parser, Debug)]
#[command(name = "honeycomb-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional JSON config file (API key still comes from HONEYCOMB_API_KEY)
    #[arg(long, global = true, env = "HONEYCOMB_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve JSON-RPC on stdin/stdout until EOF
    Stdio,

    /// Serve the gateway over HTTP
    Serve {
        /// Port to bind to (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the operation registry as JSON and exit
    Operations,

    /// Dispatch one operation, print its content envelope and exit
    Call {
        /// Operation name, e.g. honeycomb_datasets_list
        name: String,

        /// Argument bag as a JSON object
        #[arg(long = "args")]
        arguments: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call() {
        let cli = Cli::try_parse_from([
            "honeycomb-gateway",
            "call",
            "honeycomb_dataset_get",
            "--args",
            r#"{"datasetSlug":"prod"}"#,
        ])
        .unwrap();
        match cli.command {
            Command::Call { name, arguments } => {
                assert_eq!(name, "honeycomb_dataset_get");
                assert_eq!(arguments.as_deref(), Some(r#"{"datasetSlug":"prod"}"#));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from([
            "honeycomb-gateway",
            "serve",
            "--port",
            "9000",
            "--config",
            "gw.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("gw.json")));
        assert!(matches!(cli.command, Command::Serve { port: Some(9000) }));
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["honeycomb-gateway"]).is_err());
    }
}
