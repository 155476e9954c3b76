// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Querydesk: multi-channel customer query ingestion engine.

mod factory;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use querydesk_config::{QuerydeskConfig, load_config, load_config_from_path, validate_config};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "querydesk", version, about = "Multi-channel query ingestion engine")]
struct Cli {
    /// Path to a configuration file, overriding the search hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the ingestion engine until interrupted.
    Serve,
    /// Print channel and query counts from the local store, plus
    /// classifier reachability.
    Status,
    /// Configuration inspection.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Load the configuration and report every validation error.
    Validate,
    /// Print the effective merged configuration.
    Show,
}

fn load(cli: &Cli) -> Result<QuerydeskConfig, figment::Error> {
    match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Serve => {
            init_tracing(&config.engine.log_level);
            if let Err(errors) = validate_config(&config) {
                for e in &errors {
                    error!(%e, "invalid configuration");
                }
                return ExitCode::FAILURE;
            }
            match serve::run(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "engine failed");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Status => match status(&config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("status failed: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Config { command } => match command {
            ConfigCommand::Validate => match validate_config(&config) {
                Ok(()) => {
                    println!("configuration OK");
                    ExitCode::SUCCESS
                }
                Err(errors) => {
                    for e in &errors {
                        eprintln!("error: {e}");
                    }
                    ExitCode::FAILURE
                }
            },
            ConfigCommand::Show => match render_config(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("failed to render configuration: {e}");
                    ExitCode::FAILURE
                }
            },
        },
    }
}

fn render_config(config: &QuerydeskConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(config)
}

/// One-shot console report: every configured channel with its query
/// count and config key names (never values), then classifier health.
async fn status(config: &QuerydeskConfig) -> Result<(), querydesk_core::DeskError> {
    let storage = querydesk_storage::Storage::open(&config.storage.database_path).await?;

    let channels = storage.list_channels(false).await?;
    if channels.is_empty() {
        println!("no channels configured");
    }
    for channel in &channels {
        let queries = storage.list_queries_for_channel(channel.id).await?;
        let mut keys: Vec<&str> = channel.config.keys().map(String::as_str).collect();
        keys.sort_unstable();
        println!(
            "{} [{}] {}: {} queries, config keys: {}",
            channel.name,
            channel.channel_type,
            if channel.active { "active" } else { "inactive" },
            queries.len(),
            if keys.is_empty() { "(none)".to_string() } else { keys.join(", ") },
        );
    }
    println!("total queries: {}", storage.count_queries().await?);

    if config.classifier.disabled {
        println!("classifier: disabled");
    } else {
        let client = querydesk_classifier::ClassifierClient::new(&config.classifier)?;
        let health = client.health().await;
        let state = if health.ok { "ok" } else { "unreachable" };
        println!("classifier: {state} ({})", health.message);
    }

    storage.close().await
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("querydesk={log_level},warn")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
