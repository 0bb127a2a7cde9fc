//! Observability module for logging setup and metric recording.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Span helpers for recipe parsing
//! - Metric recording for parsing, conversion, resolution and deduction
//!
//! The library only records; installing a subscriber or a metrics recorder is
//! left to the binary. Without a recorder every `record_*` call is a no-op.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::prelude::*;

use crate::observability_config::{LogFormat, ObservabilityConfig};

/// Initialize structured logging with tracing and configuration
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("pantry_pilot={}", config.log_level.to_lowercase()).parse()?);

    match config.effective_log_format() {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?,
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span for parsing one recipe
pub fn parse_span(title_hint: &str) -> tracing::Span {
    tracing::debug_span!("parse_recipe", title_hint = %title_hint)
}

/// Record recipe parsing metrics
pub fn record_parse_metrics(
    duration: Duration,
    line_count: usize,
    ingredient_count: usize,
    step_count: usize,
) {
    metrics::counter!("recipe_parse_total").increment(1);
    metrics::histogram!("recipe_parse_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("recipe_source_lines").record(line_count as f64);
    metrics::histogram!("recipe_parsed_ingredients").record(ingredient_count as f64);
    metrics::histogram!("recipe_parsed_steps").record(step_count as f64);
}

/// Record the outcome of a unit conversion ("identity", "converted", "incompatible")
pub fn record_unit_conversion(result: &'static str) {
    metrics::counter!("unit_conversions_total", "result" => result).increment(1);
}

/// Record the outcome of a deduction calculation
pub fn record_deduction(outcome: &'static str) {
    metrics::counter!("deductions_total", "outcome" => outcome).increment(1);
}

/// Record ingredient resolution results for one linking pass
pub fn record_resolution_metrics(mode: &'static str, matched: usize, unmatched: usize) {
    metrics::counter!("ingredient_resolution_total", "mode" => mode, "result" => "matched")
        .increment(matched as u64);
    metrics::counter!("ingredient_resolution_total", "mode" => mode, "result" => "unmatched")
        .increment(unmatched as u64);
}
