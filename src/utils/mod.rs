//! Utilities module
//!
//! This module contains utility functions and common functionality

pub mod errors;
pub mod helpers;
pub mod logging;

pub use errors::{EngineError, Result};
