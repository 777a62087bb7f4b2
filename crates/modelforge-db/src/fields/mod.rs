//! Field descriptors and their construction.
//!
//! A declaration supplies a [`FieldKind`] and raw [`FieldOptions`]; the
//! [`FieldFactory`] validates them, resolves nullability, synthesizes the
//! storage [`ColumnType`], and returns an immutable [`FieldDescriptor`].

pub mod descriptor;
pub mod factory;
pub mod kinds;
pub mod options;
pub mod resolver;
pub mod types;

pub use descriptor::{FieldConstraints, FieldDescriptor};
pub use factory::{construct, FieldFactory};
pub use kinds::{ColumnArgs, KindSpec};
pub use options::{DefaultValue, FieldOptions};
pub use resolver::{resolve_autoincrement_optional, resolve_nullable, resolve_sql_nullable};
pub use types::{ColumnType, EnumClass, EnumMember, FieldEnum, FieldKind, Number, SemanticType};
