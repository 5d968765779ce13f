//! Shared utilities, configuration, and error handling for Mamori
//!
//! This crate provides common functionality used across the Mamori application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Telemetry initialization

pub mod config;
pub mod db;
pub mod error;
pub mod telemetry;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use telemetry::init_tracing;
