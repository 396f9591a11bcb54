//! Shared types, errors, and configuration for Caixa.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for tenant-scoped entity references
//! - Currency rounding helpers with decimal precision
//! - An injectable clock for "today"
//! - Pagination types for list queries
//! - Application-wide error types
//! - Configuration management

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorBody};
