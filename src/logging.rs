//! # Structured Logging Module
//!
//! Environment-aware structured logging for query compilation and assignment
//! transactions. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let directive = if config.level.trim().is_empty() {
            get_log_level(&environment)
        } else {
            config.level.clone()
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

        let layer = if config.json {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .boxed()
        };

        // A subscriber may already be installed by an embedding application.
        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
        }

        tracing::info!(
            environment = %environment,
            level = %directive,
            json = config.json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Current environment: `TODO_ENV || APP_ENV || 'development'`
pub fn get_environment() -> String {
    std::env::var("TODO_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Default log level for an environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        "test" => "warn".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log a compiled query plan
pub fn log_query_plan(entity: &str, joins: usize, order_terms: usize, predicate: Option<&str>) {
    tracing::debug!(
        entity = %entity,
        joins = joins,
        order_terms = order_terms,
        predicate = predicate,
        timestamp = %Utc::now().to_rfc3339(),
        "🔎 QUERY_PLAN"
    );
}

/// Log the result of one assignment attempt
pub fn log_assignment_operation(resource_id: &str, owner: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        resource_id = %resource_id,
        owner = %owner,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📌 ASSIGNMENT_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
