//! # modelforge
//!
//! Declarative ORM field typing: one model declaration yields both a
//! validation schema and a physical table schema.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `modelforge` to get everything, or depend on
//! individual crates for finer-grained control.
//!
//! ```
//! use modelforge::db::fields::{FieldKind, FieldOptions};
//! use modelforge::db::model::ModelBuilder;
//!
//! let schema = ModelBuilder::new("Album")
//!     .field("id", FieldKind::Integer, FieldOptions::new().primary_key(true))
//!     .field("name", FieldKind::String, FieldOptions::new().max_length(100))
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.pk_name(), "id");
//! ```

/// Errors, settings, settings loading, and logging.
pub use modelforge_core as core;

/// Field descriptors, model assembly, validation schema, and model checks.
#[cfg(feature = "db")]
pub use modelforge_db as db;

pub use modelforge_core::{ModelError, ModelResult, Settings, ValidationError, SETTINGS};

// Third-party crates used in public signatures.
pub use chrono;
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;
pub use uuid;
