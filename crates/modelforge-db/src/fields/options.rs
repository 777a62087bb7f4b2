//! Raw field options as supplied by a model declaration.
//!
//! [`FieldOptions`] records every option a declaration may pass to the field
//! factory. Every option is optional here; which ones are required and which
//! are read depends on the field kind. The factory normalizes and validates
//! the record once and turns it into an immutable
//! [`FieldDescriptor`](super::FieldDescriptor).

use std::fmt;
use std::sync::Arc;

use modelforge_core::UuidFormat;
use serde::Deserialize;

use super::types::{EnumClass, FieldEnum, Number, SemanticType};
use crate::encryption::{EncryptBackend, EncryptBackendKind};
use crate::value::Value;

/// A default value, or a zero-argument producer evaluated on each use.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value.
    Value(Value),
    /// A producer called every time a default is needed.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Wraps a producer function.
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(f))
    }

    /// Returns `false` for a `Null` value, which counts as "no default".
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Value(Value::Null))
    }

    /// Returns `true` if this default is computed by a producer.
    pub const fn is_producer(&self) -> bool {
        matches!(self, Self::Producer(_))
    }

    /// Returns the default, calling the producer if there is one.
    pub fn evaluate(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for DefaultValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        crate::value::deserialize_literal(deserializer).map(Self::Value)
    }
}

/// The options of one field declaration.
///
/// Built with the fluent setters, or deserialized from a declaration file.
/// Producers and custom encryption backends can only be set from code.
///
/// # Examples
///
/// ```
/// use modelforge_db::fields::{FieldKind, FieldOptions};
///
/// let price = FieldKind::Decimal
///     .construct(FieldOptions::new().max_digits(10).decimal_places(2))
///     .unwrap();
/// assert_eq!(price.column_type().to_string(), "DECIMAL(10, 2)");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    // ── Length / text ────────────────────────────────────────────────
    /// Maximum length (String, LargeBinary; optional validation bound for Text).
    pub max_length: Option<i64>,
    /// Minimum length (String, Text).
    pub min_length: Option<u32>,
    /// Pattern values must match (String, Text).
    pub regex: Option<String>,

    // ── Numeric ──────────────────────────────────────────────────────
    /// Inclusive lower bound.
    pub minimum: Option<Number>,
    /// Inclusive upper bound.
    pub maximum: Option<Number>,
    /// Values must be a multiple of this step.
    pub multiple_of: Option<Number>,
    /// Decimal precision; alias of `max_digits`.
    pub precision: Option<i64>,
    /// Decimal scale; alias of `decimal_places`.
    pub scale: Option<i64>,
    /// Decimal total digits; alias of `precision`.
    pub max_digits: Option<i64>,
    /// Decimal fractional digits; alias of `scale`.
    pub decimal_places: Option<i64>,

    // ── Kind specific ────────────────────────────────────────────────
    /// Timezone-aware storage (DateTime, Time).
    pub timezone: Option<bool>,
    /// UUID storage layout.
    pub uuid_format: Option<UuidFormat>,
    /// The enumeration an Enum field ranges over.
    pub enum_class: Option<EnumClass>,
    /// Expose a LargeBinary as a base64 string.
    pub represent_as_base64_str: Option<bool>,

    // ── Encryption ───────────────────────────────────────────────────
    /// Secret handed to the encryption backend.
    pub encrypt_secret: Option<String>,
    /// Which encryption backend to use.
    pub encrypt_backend: Option<EncryptBackendKind>,
    /// The implementation used with [`EncryptBackendKind::Custom`].
    #[serde(skip)]
    pub encrypt_custom_backend: Option<Arc<dyn EncryptBackend>>,

    // ── Keys and nullability ─────────────────────────────────────────
    /// Marks the field as the model's primary key.
    pub primary_key: Option<bool>,
    /// Server-assigned values.
    pub autoincrement: Option<bool>,
    /// Semantic (validation-layer) optionality.
    pub nullable: Option<bool>,
    /// Storage-layer optionality.
    pub sql_nullable: Option<bool>,
    /// Default applied when the attribute is omitted.
    pub default: Option<DefaultValue>,
    /// Default applied by the database server.
    pub server_default: Option<DefaultValue>,

    // ── Column extras ────────────────────────────────────────────────
    /// Create an index on the column.
    pub index: Option<bool>,
    /// Add a UNIQUE constraint on the column.
    pub unique: Option<bool>,
    /// Column name, when it differs from the attribute name.
    pub name: Option<String>,
    /// Semantic type to validate against instead of the declared one.
    #[serde(alias = "overwrite_pydantic_type")]
    pub overwrite_semantic_type: Option<SemanticType>,
    /// Validate the attribute but give it no table column.
    #[serde(alias = "pydantic_only")]
    pub validation_only: Option<bool>,
}

impl FieldOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the minimum length.
    #[must_use]
    pub const fn min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets the pattern values must match.
    #[must_use]
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Sets the inclusive lower bound.
    #[must_use]
    pub fn minimum(mut self, minimum: impl Into<Number>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub fn maximum(mut self, maximum: impl Into<Number>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    /// Sets the step values must be a multiple of.
    #[must_use]
    pub fn multiple_of(mut self, step: impl Into<Number>) -> Self {
        self.multiple_of = Some(step.into());
        self
    }

    /// Sets the decimal precision.
    #[must_use]
    pub const fn precision(mut self, precision: i64) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the decimal scale.
    #[must_use]
    pub const fn scale(mut self, scale: i64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the decimal total digit count.
    #[must_use]
    pub const fn max_digits(mut self, max_digits: i64) -> Self {
        self.max_digits = Some(max_digits);
        self
    }

    /// Sets the decimal fractional digit count.
    #[must_use]
    pub const fn decimal_places(mut self, decimal_places: i64) -> Self {
        self.decimal_places = Some(decimal_places);
        self
    }

    /// Sets timezone-aware storage.
    #[must_use]
    pub const fn timezone(mut self, timezone: bool) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Sets the UUID storage layout.
    #[must_use]
    pub const fn uuid_format(mut self, format: UuidFormat) -> Self {
        self.uuid_format = Some(format);
        self
    }

    /// Sets the enumeration.
    #[must_use]
    pub fn enum_class(mut self, class: EnumClass) -> Self {
        self.enum_class = Some(class);
        self
    }

    /// Sets the enumeration from a Rust enum.
    #[must_use]
    pub fn enum_of<E: FieldEnum>(self) -> Self {
        self.enum_class(E::enum_class())
    }

    /// Exposes a LargeBinary as a base64 string.
    #[must_use]
    pub const fn represent_as_base64_str(mut self, flag: bool) -> Self {
        self.represent_as_base64_str = Some(flag);
        self
    }

    /// Sets the encryption backend and secret.
    #[must_use]
    pub fn encrypt(mut self, backend: EncryptBackendKind, secret: impl Into<String>) -> Self {
        self.encrypt_backend = Some(backend);
        self.encrypt_secret = Some(secret.into());
        self
    }

    /// Sets the implementation used with [`EncryptBackendKind::Custom`].
    #[must_use]
    pub fn encrypt_custom_backend(mut self, backend: Arc<dyn EncryptBackend>) -> Self {
        self.encrypt_custom_backend = Some(backend);
        self
    }

    /// Marks (or unmarks) the field as primary key.
    #[must_use]
    pub const fn primary_key(mut self, flag: bool) -> Self {
        self.primary_key = Some(flag);
        self
    }

    /// Sets autoincrement explicitly.
    #[must_use]
    pub const fn autoincrement(mut self, flag: bool) -> Self {
        self.autoincrement = Some(flag);
        self
    }

    /// Sets semantic nullability explicitly.
    #[must_use]
    pub const fn nullable(mut self, flag: bool) -> Self {
        self.nullable = Some(flag);
        self
    }

    /// Sets storage nullability explicitly.
    #[must_use]
    pub const fn sql_nullable(mut self, flag: bool) -> Self {
        self.sql_nullable = Some(flag);
        self
    }

    /// Sets a fixed default.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Sets a default producer.
    #[must_use]
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::producer(producer));
        self
    }

    /// Sets a fixed server default.
    #[must_use]
    pub fn server_default(mut self, value: impl Into<Value>) -> Self {
        self.server_default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Sets a server default producer.
    #[must_use]
    pub fn server_default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.server_default = Some(DefaultValue::producer(producer));
        self
    }

    /// Requests an index on the column.
    #[must_use]
    pub const fn index(mut self, flag: bool) -> Self {
        self.index = Some(flag);
        self
    }

    /// Requests a UNIQUE constraint on the column.
    #[must_use]
    pub const fn unique(mut self, flag: bool) -> Self {
        self.unique = Some(flag);
        self
    }

    /// Sets the column name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Keeps the attribute out of the table.
    #[must_use]
    pub const fn validation_only(mut self, flag: bool) -> Self {
        self.validation_only = Some(flag);
        self
    }

    /// Validates against `semantic_type` instead of the declared type.
    #[must_use]
    pub fn overwrite_semantic_type(mut self, semantic_type: SemanticType) -> Self {
        self.overwrite_semantic_type = Some(semantic_type);
        self
    }
}
