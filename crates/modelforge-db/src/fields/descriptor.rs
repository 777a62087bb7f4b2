//! The immutable field descriptor.

use serde::Serialize;

use super::options::DefaultValue;
use super::types::{ColumnType, EnumClass, FieldKind, Number, SemanticType};
use crate::encryption::EncryptionConfig;
use crate::value::Value;

/// Constraints handed to the validation layer.
///
/// None of these affect the storage column. `multiple_of` in particular is
/// enforced on values only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldConstraints {
    /// Inclusive lower bound.
    pub ge: Option<Number>,
    /// Inclusive upper bound.
    pub le: Option<Number>,
    /// Values must be a multiple of this step.
    pub multiple_of: Option<Number>,
    /// Minimum string length.
    pub min_length: Option<u32>,
    /// Maximum string length.
    pub max_length: Option<u32>,
    /// Pattern strings must match.
    pub regex: Option<String>,
    /// Maximum number of decimal digits.
    pub max_digits: Option<u32>,
    /// Maximum number of fractional decimal digits.
    pub decimal_places: Option<u32>,
    /// Values are base64 text encoding bytes.
    pub base64: bool,
}

impl FieldConstraints {
    /// Returns `true` if no constraint is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Resolved, immutable metadata describing one model attribute.
///
/// Built once by the [`FieldFactory`](super::FieldFactory) and shared by
/// every instance of the model.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub(crate) kind: FieldKind,
    pub(crate) declared_type: SemanticType,
    pub(crate) semantic_type: SemanticType,
    pub(crate) column_type: ColumnType,
    pub(crate) constraints: FieldConstraints,
    pub(crate) alias: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) autoincrement: bool,
    pub(crate) nullable: bool,
    pub(crate) sql_nullable: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) server_default: Option<DefaultValue>,
    pub(crate) index: bool,
    pub(crate) unique: bool,
    pub(crate) validation_only: bool,
    pub(crate) sample: Option<Value>,
    pub(crate) encryption: Option<EncryptionConfig>,
}

impl FieldDescriptor {
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The type the field was declared with: the enum class when one was
    /// supplied, else the kind's built-in type.
    pub const fn declared_type(&self) -> &SemanticType {
        &self.declared_type
    }

    /// The type values are validated against.
    ///
    /// Differs from [`declared_type`](Self::declared_type) for base64
    /// binaries and when `overwrite_semantic_type` was given.
    pub const fn semantic_type(&self) -> &SemanticType {
        &self.semantic_type
    }

    /// The storage column type.
    pub const fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub const fn constraints(&self) -> &FieldConstraints {
        &self.constraints
    }

    /// The declared column name, if it differs from the attribute name.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub const fn primary_key(&self) -> bool {
        self.primary_key
    }

    pub const fn autoincrement(&self) -> bool {
        self.autoincrement
    }

    /// Semantic (validation-layer) optionality.
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Storage-layer optionality. Always `false` for a primary key.
    pub const fn sql_nullable(&self) -> bool {
        self.sql_nullable
    }

    pub const fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub const fn server_default(&self) -> Option<&DefaultValue> {
        self.server_default.as_ref()
    }

    /// Returns `true` if a present `default` or `server_default` exists.
    pub fn has_default(&self) -> bool {
        self.default.as_ref().is_some_and(DefaultValue::is_present)
            || self
                .server_default
                .as_ref()
                .is_some_and(DefaultValue::is_present)
    }

    pub const fn index(&self) -> bool {
        self.index
    }

    pub const fn unique(&self) -> bool {
        self.unique
    }

    /// Returns `true` if the attribute is validated but not stored.
    pub const fn validation_only(&self) -> bool {
        self.validation_only
    }

    /// A representative value for documentation and schema examples.
    pub const fn sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }

    /// Encryption metadata, when the field is encrypted.
    pub const fn encryption(&self) -> Option<&EncryptionConfig> {
        self.encryption.as_ref()
    }

    pub const fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }

    /// The enumeration the field was declared over, if any.
    pub const fn enum_class(&self) -> Option<&EnumClass> {
        match &self.declared_type {
            SemanticType::Enum(class) => Some(class),
            _ => None,
        }
    }

    /// The column name: the alias, or `attribute` when there is none.
    pub fn column_name<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(attribute)
    }
}
