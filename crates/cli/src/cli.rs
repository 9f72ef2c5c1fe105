//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

/// Interaction Pipeline - learning-interaction stream ingestion service
#[derive(Parser, Debug)]
#[command(
    name = "interaction-pipeline",
    author,
    version,
    about = "Learning-interaction stream ingestion pipeline",
    long_about = "Consumes learning interactions from a Redis stream via a consumer \n\
                  group, decodes and forwards them to the analysis service, and \n\
                  exposes rolling throughput and latency metrics."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PIPELINE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PIPELINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingestion pipeline
    Run(RunArgs),

    /// Validate configuration without connecting anywhere
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Redis connection URL
    #[arg(long, default_value = "redis://127.0.0.1:6379", env = "REDIS_URL")]
    pub redis_url: String,

    /// Stream key to consume
    #[arg(
        long,
        default_value = "learning:interactions",
        env = "INTERACTION_STREAM_KEY"
    )]
    pub stream_key: String,

    /// Consumer group name
    #[arg(long, default_value = "interaction-analyzer", env = "INTERACTION_GROUP")]
    pub group: String,

    /// Consumer name within the group (defaults to the hostname)
    #[arg(long, env = "INTERACTION_CONSUMER")]
    pub consumer: Option<String>,

    /// Maximum entries claimed per poll
    #[arg(long, default_value = "250", env = "INTERACTION_BATCH_SIZE")]
    pub batch_size: usize,

    /// Blocking read timeout in milliseconds
    #[arg(long, default_value = "2000", env = "INTERACTION_BLOCK_MS")]
    pub block_ms: u64,

    /// Consecutive broker failures before the circuit opens
    #[arg(long, default_value = "5", env = "CIRCUIT_FAILURE_THRESHOLD")]
    pub failure_threshold: u32,

    /// Open-circuit cooldown in milliseconds
    #[arg(long, default_value = "5000", env = "CIRCUIT_COOLDOWN_MS")]
    pub cooldown_ms: u64,

    /// Analysis service base URL (unset = run without a downstream)
    #[arg(long, env = "ANALYZER_URL")]
    pub analyzer_url: Option<String>,

    /// Dispatch request timeout in milliseconds
    #[arg(long, default_value = "10000", env = "ANALYZER_TIMEOUT_MS")]
    pub dispatch_timeout_ms: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "PIPELINE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
