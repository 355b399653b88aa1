//! latcast - Latency and throughput predictions from benchmark data

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use latcast_core::{Config, FitMethod, LoggingConfig};
use latcast_predict::PredictError;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod data;
mod output;

use output::OutputFormat;

/// Predict LLM latency and throughput at unseen token lengths
#[derive(Debug, Parser)]
#[command(name = "latcast")]
#[command(about = "Predict LLM latency and throughput at unseen token lengths")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Benchmark rows (JSON or YAML array)
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (overrides the configuration file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Predict metrics for a model at a target token point
    Predict {
        /// Model name
        #[arg(short, long)]
        model: String,

        /// Target input tokens
        #[arg(long)]
        input: f64,

        /// Target output tokens
        #[arg(long)]
        output_tokens: f64,

        /// Target traffic level; enables the traffic-aware fit
        #[arg(long)]
        traffic: Option<f64>,

        /// Fitting method (auto_detect, polynomial, linear, average)
        #[arg(long, default_value = "auto_detect")]
        method: FitMethod,
    },

    /// Show the aggregated observations for a model
    Observations {
        /// Model name
        #[arg(short, long)]
        model: String,
    },

    /// List models with benchmark data
    Models,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Check the configuration and report problems
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging, cli.log_level.as_deref(), cli.verbose);

    debug!("Starting latcast with {:?}", cli);

    if let Err(err) = run(cli, &config) {
        error!("{:#}", err);
        process::exit(exit_status(&err));
    }

    Ok(())
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Predict {
            model,
            input,
            output_tokens,
            traffic,
            method,
        } => {
            let store = data::load_store(cli.data.as_deref())?;
            let args = commands::predict::PredictArgs {
                model,
                input_tokens: input,
                output_tokens,
                traffic_level: traffic,
                method,
            };
            commands::predict::predict(&store, config, args, cli.output)
        }

        Commands::Observations { model } => {
            let store = data::load_store(cli.data.as_deref())?;
            commands::observations::show_observations(&store, config, &model, cli.output)
        }

        Commands::Models => {
            let store = data::load_store(cli.data.as_deref())?;
            commands::models::list_models(&store, cli.output)
        }

        Commands::Config { action } => {
            commands::config::handle_config_command(config, action, cli.output)
        }
    }
}

/// 2 for failures the caller can fix by changing its input, 1 otherwise
fn exit_status(err: &anyhow::Error) -> i32 {
    let client_error = err.chain().any(|cause| {
        cause
            .downcast_ref::<latcast_core::Error>()
            .is_some_and(latcast_core::Error::is_client_error)
            || cause
                .downcast_ref::<PredictError>()
                .is_some_and(PredictError::is_client_error)
    });
    if client_error {
        2
    } else {
        1
    }
}

/// Explicit file first, otherwise `LATCAST_CONFIG`, `./latcast.*` and the environment
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Config::load().context("Failed to load configuration"),
    }
}

/// `RUST_LOG` wins over `--log-level`, which wins over the configured level
fn init_tracing(logging: &LoggingConfig, log_level: Option<&str>, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        match log_level.unwrap_or(&logging.level).to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "latcast={0},latcast_core={0},latcast_predict={0}",
            level
        )
        .into()
    });

    // stderr keeps JSON and YAML output on stdout machine-readable
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    info!("Logging at {}", level);
}
