#![forbid(unsafe_code)]

//! `devlink` — remote development environment CLI.
//!
//! Thin front end over the [`Adapter`]: each subcommand builds one
//! [`ToolRequest`], dispatches it, and prints the text response.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use devlink::adapter::{Adapter, ToolRequest};
use devlink::{AppError, Config, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "devlink", about = "Remote development environment adapter", version, long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a shell command in the remote environment.
    Exec {
        /// Command line to execute.
        command: Vec<String>,
    },
    /// Operate on remote files.
    File {
        /// Operation: read, write, list, or delete.
        operation: String,
        /// Workspace path.
        path: String,
        /// Content (write only).
        content: Option<String>,
    },
    /// Start a remote analysis run.
    Analyze {
        /// Optional path to scope the analysis.
        path: Option<String>,
    },
    /// Run tests remotely.
    Test {
        /// Operation: repository or local.
        operation: String,
        /// Repository URL or local path.
        target: Option<String>,
    },
    /// Manage projects.
    Project {
        /// Operation: list, get, create, update, or delete.
        operation: String,
        /// Project id (get/update/delete).
        #[arg(long)]
        id: Option<String>,
        /// JSON body (create/update).
        #[arg(long)]
        body: Option<String>,
    },
    /// Print the agent-facing description of the adapter.
    Describe,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.load_auth_token().await;
    info!("configuration loaded");

    let adapter = Adapter::new(&config);

    if matches!(&args.command, Command::Describe) {
        println!("{}", adapter.describe());
        return Ok(());
    }

    let request = build_request(args.command)?;
    let response = adapter.dispatch(request).await;

    // Tear the session down before propagating any dispatch failure.
    adapter.close().await;

    println!("{}", response?);
    Ok(())
}

fn build_request(command: Command) -> Result<ToolRequest> {
    let request = match command {
        Command::Exec { command } => ToolRequest {
            action: "terminal".to_owned(),
            command: Some(command.join(" ")),
            ..ToolRequest::default()
        },
        Command::File {
            operation,
            path,
            content,
        } => ToolRequest {
            action: "file".to_owned(),
            operation: Some(operation),
            path: Some(path),
            content,
            ..ToolRequest::default()
        },
        Command::Analyze { path } => ToolRequest {
            action: "analysis".to_owned(),
            path,
            ..ToolRequest::default()
        },
        Command::Test { operation, target } => ToolRequest {
            action: "test".to_owned(),
            operation: Some(operation),
            target,
            ..ToolRequest::default()
        },
        Command::Project {
            operation,
            id,
            body,
        } => {
            let body = body
                .map(|raw| {
                    serde_json::from_str::<Value>(&raw).map_err(|err| {
                        AppError::InvalidArgument(format!("body is not valid JSON: {err}"))
                    })
                })
                .transpose()?;
            ToolRequest {
                action: "project".to_owned(),
                operation: Some(operation),
                id,
                body,
                ..ToolRequest::default()
            }
        }
        Command::Describe => unreachable!("handled before dispatch"),
    };
    Ok(request)
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
