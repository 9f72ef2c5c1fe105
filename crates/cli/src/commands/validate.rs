//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::commands::identity_from_args;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    stream_key: String,
    group: String,
    consumer: String,
    batch_size: usize,
    block_ms: u64,
    analyzer_configured: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!("Validating pipeline configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let identity = match identity_from_args(&args.run).validated() {
        Ok(identity) => identity,
        Err(e) => {
            return ValidationResult {
                valid: false,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            };
        }
    };

    if !args.run.redis_url.starts_with("redis://") && !args.run.redis_url.starts_with("rediss://") {
        return ValidationResult {
            valid: false,
            error: Some(format!(
                "Redis URL must use the redis:// or rediss:// scheme: {}",
                args.run.redis_url
            )),
            warnings: None,
            summary: None,
        };
    }

    let warnings = collect_warnings(&args.run);

    ValidationResult {
        valid: true,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            stream_key: identity.stream_key,
            group: identity.group,
            consumer: identity.consumer,
            batch_size: identity.batch_size,
            block_ms: identity.block_ms,
            analyzer_configured: args.run.analyzer_url.is_some(),
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(args: &crate::cli::RunArgs) -> Vec<String> {
    let mut warnings = Vec::new();

    if args.analyzer_url.is_none() {
        warnings.push("No analyzer URL configured - entries will be drained without dispatch".to_string());
    }

    if let Some(url) = &args.analyzer_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            warnings.push(format!("Analyzer URL has no http(s) scheme: {}", url));
        }
    }

    if args.metrics_port == 0 {
        warnings.push("Metrics endpoint disabled (metrics_port = 0)".to_string());
    }

    if args.cooldown_ms < 1_000 {
        warnings.push(format!(
            "Circuit cooldown of {}ms is aggressive for a shared broker",
            args.cooldown_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid");

        if let Some(ref summary) = result.summary {
            println!("\n  Stream: {}", summary.stream_key);
            println!("  Group: {}", summary.group);
            println!("  Consumer: {}", summary.consumer);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Block timeout: {}ms", summary.block_ms);
            println!(
                "  Analyzer: {}",
                if summary.analyzer_configured {
                    "configured"
                } else {
                    "absent"
                }
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid");
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
