//! GatherPay commerce engine
//!
//! Library-style engine for event registration commerce: eligibility gating,
//! fee computation, dynamic per-event form validation, merchandise carts,
//! and cohort-level batch collection campaigns with bulk auto-registration.
//! Surrounding request handlers supply validated input and invoke the
//! services defined here; all state lives in the relational store.

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EngineError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
