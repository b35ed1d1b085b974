//! Sweetspot Common Utilities
//!
//! Shared infrastructure for all Sweetspot crates:
//! - Error types and result aliases
//! - Clock and update-throttle utilities
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
