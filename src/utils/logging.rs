//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the engine.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "gatherpay.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log registration lifecycle actions with structured data
pub fn log_registration_action(event_id: i64, user_id: i64, action: &str, details: Option<&str>) {
    info!(
        event_id = event_id,
        user_id = user_id,
        action = action,
        details = details,
        "Registration action performed"
    );
}

/// Log batch collection transitions
pub fn log_collection_transition(collection_id: i64, from: &str, to: &str, actor_id: Option<i64>) {
    info!(
        collection_id = collection_id,
        from = from,
        to = to,
        actor_id = actor_id,
        "Batch collection transition"
    );
}

/// Log rejected eligibility or modification checks
pub fn log_rejection(event_id: i64, user_id: i64, reason: &str) {
    warn!(
        event_id = event_id,
        user_id = user_id,
        reason = reason,
        "Request rejected"
    );
}
