//! Core error types for modelforge.
//!
//! This module provides the error enum [`ModelError`]. Every failure that can
//! happen while declaring a model (bad field options, a missing primary key,
//! an unreadable settings file) is reported through it, and so are the
//! value-level failures raised later by a model's validation schema.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Represents a value-level validation error with optional per-field errors.
///
/// Validation errors are either simple (a single message) or compound
/// (holding per-attribute error lists, as produced when validating a whole
/// model input at once).
///
/// # Examples
///
/// ```
/// use modelforge_core::error::ValidationError;
///
/// // Simple validation error
/// let err = ValidationError::new("Field required.", "required");
///
/// // Attribute-level validation errors
/// let mut field_errors = std::collections::HashMap::new();
/// field_errors.insert(
///     "test_string".to_string(),
///     vec![ValidationError::new("Field required.", "required")],
/// );
/// let err = ValidationError::with_field_errors(field_errors);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the type of validation failure (e.g. "required", "type").
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
    /// Per-attribute validation errors, keyed by attribute name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-attribute errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the errors recorded for one attribute, if any.
    pub fn errors_for(&self, attribute: &str) -> &[Self] {
        self.field_errors.get(attribute).map_or(&[], Vec::as_slice)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            // Sorted so the rendering is stable across runs.
            let mut fields: Vec<_> = self.field_errors.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            let mut first = true;
            for (field, errors) in fields {
                for error in errors {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for modelforge.
///
/// `ModelDefinition` is the single failure kind for everything detected while
/// a model is being declared. It is raised synchronously and never deferred to
/// instance creation. `Validation` is the distinct kind raised when a value is
/// checked against an already-declared model.
#[derive(Error, Debug)]
pub enum ModelError {
    // ── Declaration ──────────────────────────────────────────────────

    /// A field or model declaration is invalid.
    #[error("Model definition error: {0}")]
    ModelDefinition(String),

    // ── Validation ───────────────────────────────────────────────────

    /// One or more values failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Shorthand for building a [`ModelError::ModelDefinition`].
    pub fn definition(message: impl Into<String>) -> Self {
        Self::ModelDefinition(message.into())
    }

    /// Returns `true` if this error was raised while declaring a model.
    pub const fn is_definition_error(&self) -> bool {
        matches!(self, Self::ModelDefinition(_))
    }

    /// Returns `true` if this error was raised while validating a value.
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationError> for ModelError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// A convenience type alias for `Result<T, ModelError>`.
pub type ModelResult<T> = Result<T, ModelError>;
