//! # modelforge-db
//!
//! Field descriptors and schema synthesis for modelforge. A model is declared
//! once; each declared attribute becomes an immutable
//! [`FieldDescriptor`](fields::FieldDescriptor), and the descriptors feed both
//! the physical [`TableSchema`](model::TableSchema) and the
//! [`ValidationSchema`](schema::ValidationSchema) of the model.
//!
//! ## Architecture
//!
//! Every field kind goes through the same construction pipeline in
//! [`FieldFactory`](fields::FieldFactory). The kind-specific parts (option
//! normalization, option validation, column synthesis) are looked up in a
//! static capability table ([`fields::kinds`]). Construction fails fast with
//! [`ModelError::ModelDefinition`](modelforge_core::ModelError::ModelDefinition)
//! and never returns a partial descriptor.
//!
//! ## Module Overview
//!
//! - [`fields`] - Field kinds, options, descriptors, and the factory
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`encryption`] - Encryption metadata and backends
//! - [`validators`] - Value validators built from field constraints
//! - [`schema`] - The validation schema and value coercion
//! - [`model`] - Model assembly, table schema, declarations, and instances
//! - [`checks`] - Model checks for suspicious field configurations

// These clippy lints are intentionally allowed for this crate:
// - struct_excessive_bools: descriptors and columns carry many independent flags
// - result_large_err: ModelError is the framework error type and should be used consistently
// - doc_markdown: backtick requirements for documentation items are too strict
// - needless_pass_by_value: options records are consumed by the factory
// - missing_const_for_fn: several accessors may grow non-const logic
// - option_if_let_else: match on Option reads clearer in coercion code
// - match_same_arms: per-kind tables repeat arms on purpose
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]

pub mod checks;
pub mod encryption;
pub mod fields;
pub mod model;
pub mod schema;
pub mod validators;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use checks::{CheckLevel, CheckMessage, CheckRegistry};
pub use encryption::{EncryptBackend, EncryptBackendKind, EncryptionConfig, HashBackend};
pub use fields::{
    construct, ColumnType, DefaultValue, EnumClass, FieldConstraints, FieldDescriptor, FieldEnum,
    FieldFactory, FieldKind, FieldOptions, Number, SemanticType,
};
pub use model::{Column, ModelBuilder, ModelDeclaration, ModelInstance, ModelSchema, TableSchema};
pub use schema::{FieldValidator, ValidationSchema};
pub use value::Value;
