//! Configuration management for the rating ledger
//!
//! This module handles configuration loading from environment variables or
//! a TOML file, validation, and default values.

pub mod app;
pub mod rating;
pub mod storage;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use rating::RatingSettings;
pub use storage::{StorageBackend, StorageSettings};
