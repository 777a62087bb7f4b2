//! # modelforge-core
//!
//! Core types for the modelforge crates: the error taxonomy, settings and
//! settings loading, and tracing setup. This crate has no modelforge
//! dependencies and is the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Process-wide settings and declaration defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{ModelError, ModelResult, ValidationError};
pub use settings::{FieldDefaults, Settings, UuidFormat, SETTINGS};
