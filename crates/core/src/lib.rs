//! Clinic Assistant Core Library
//!
//! This crate provides the foundational utilities shared by every crate in
//! the workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - The clinic profile (identity, domain, contact details)

pub mod clinic;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use clinic::ClinicProfile;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
