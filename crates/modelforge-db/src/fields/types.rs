//! Type vocabulary for field descriptors.
//!
//! A field has three related types:
//!
//! - [`FieldKind`] names the declaration (`String`, `Decimal`, `Enum`, ...).
//! - [`SemanticType`] is the application-level value type the validation
//!   schema checks against.
//! - [`ColumnType`] is the storage column the physical table is built from.
//!
//! The semantic and storage types diverge for base64-represented binaries,
//! enum-backed columns, and encrypted fields.

use std::fmt;

use modelforge_core::UuidFormat;
use serde::{Deserialize, Serialize};

use crate::encryption::EncryptBackendKind;
use crate::value::Value;

/// The declared kind of a field.
///
/// Each variant selects one entry of the factory's capability table, which
/// decides the options the field validates and the column it synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Length-bounded text.
    String,
    /// Unbounded text.
    Text,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// 16-bit integer.
    SmallInteger,
    /// Floating-point number.
    Float,
    /// Boolean.
    Boolean,
    /// Date and time.
    DateTime,
    /// Date without time.
    Date,
    /// Time without date.
    Time,
    /// JSON document.
    #[serde(alias = "JSON")]
    Json,
    /// Length-bounded binary data.
    LargeBinary,
    /// Fixed-precision decimal.
    Decimal,
    /// UUID.
    #[serde(alias = "UUID")]
    Uuid,
    /// Enumeration over an [`EnumClass`].
    Enum,
}

impl FieldKind {
    /// Every kind, in declaration order of the capability table.
    pub const ALL: [Self; 15] = [
        Self::String,
        Self::Text,
        Self::Integer,
        Self::BigInteger,
        Self::SmallInteger,
        Self::Float,
        Self::Boolean,
        Self::DateTime,
        Self::Date,
        Self::Time,
        Self::Json,
        Self::LargeBinary,
        Self::Decimal,
        Self::Uuid,
        Self::Enum,
    ];

    /// Returns the human-readable kind name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::BigInteger => "BigInteger",
            Self::SmallInteger => "SmallInteger",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Json => "JSON",
            Self::LargeBinary => "LargeBinary",
            Self::Decimal => "Decimal",
            Self::Uuid => "UUID",
            Self::Enum => "Enum",
        }
    }

    /// Returns `true` for the integer family, whose autoincrement follows `primary_key`.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Integer | Self::BigInteger | Self::SmallInteger)
    }

    /// Returns `true` for kinds that accept `minimum`/`maximum`/`multiple_of`.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::BigInteger | Self::SmallInteger | Self::Float | Self::Decimal
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One member of an [`EnumClass`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    /// The member name (e.g. `"ACTIVE"`).
    pub name: String,
    /// The member value (e.g. `Value::Int(1)` or `Value::String("active")`).
    /// Declaration files give it as a plain literal.
    #[serde(deserialize_with = "crate::value::deserialize_literal")]
    pub value: Value,
}

/// An enumeration type a field can be declared over.
///
/// # Examples
///
/// ```
/// use modelforge_db::fields::EnumClass;
///
/// let status = EnumClass::new("Status")
///     .member("DRAFT", "draft")
///     .member("PUBLISHED", "published");
/// assert_eq!(status.members.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumClass {
    /// The enumeration's name.
    pub name: String,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<EnumMember>,
}

impl EnumClass {
    /// Creates an enumeration with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Appends a member.
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builds the enumeration a Rust enum describes.
    pub fn of<E: FieldEnum>() -> Self {
        E::enum_class()
    }

    /// Looks a member up by name, or by value when no name matches.
    pub fn find(&self, value: &Value) -> Option<&EnumMember> {
        if let Value::String(s) = value {
            if let Some(m) = self.members.iter().find(|m| &m.name == s) {
                return Some(m);
            }
        }
        self.members.iter().find(|m| &m.value == value)
    }

    /// Returns the member names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Checks that this is a usable enumeration: at least one member and no
    /// repeated member names.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.members.is_empty() {
            return Err(format!("enumeration '{}' has no members", self.name));
        }
        for (i, member) in self.members.iter().enumerate() {
            if self.members[..i].iter().any(|m| m.name == member.name) {
                return Err(format!(
                    "enumeration '{}' repeats member '{}'",
                    self.name, member.name
                ));
            }
        }
        Ok(())
    }
}

/// Implemented by Rust enums that can back an `Enum` field.
///
/// # Examples
///
/// ```
/// use modelforge_db::fields::{EnumClass, FieldEnum};
///
/// enum Color {
///     Red,
///     Green,
/// }
///
/// impl FieldEnum for Color {
///     fn enum_class() -> EnumClass {
///         EnumClass::new("Color").member("Red", "red").member("Green", "green")
///     }
/// }
///
/// assert_eq!(EnumClass::of::<Color>().names(), vec!["Red", "Green"]);
/// ```
pub trait FieldEnum {
    /// Describes the enumeration's members.
    fn enum_class() -> EnumClass;
}

/// A numeric bound or step (`minimum`, `maximum`, `multiple_of`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// An integer bound.
    Int(i64),
    /// A floating-point bound.
    Float(f64),
}

impl Number {
    /// Returns the bound as a float for mixed comparisons.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// The application-level value type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// UTF-8 text.
    String,
    /// Signed integer.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean.
    Boolean,
    /// Date and time.
    DateTime,
    /// Date.
    Date,
    /// Time of day.
    Time,
    /// JSON document.
    Json,
    /// Raw bytes.
    Bytes,
    /// Fixed-precision decimal.
    Decimal,
    /// UUID.
    Uuid,
    /// A member of the given enumeration.
    Enum(EnumClass),
}

impl SemanticType {
    /// Returns `true` for string-like semantic types.
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::DateTime => write!(f, "datetime"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Json => write!(f, "json"),
            Self::Bytes => write!(f, "bytes"),
            Self::Decimal => write!(f, "decimal"),
            Self::Uuid => write!(f, "uuid"),
            Self::Enum(class) => write!(f, "enum {}", class.name),
        }
    }
}

/// The storage column type of a field.
///
/// `Display` renders a generic, dialect-neutral type name for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ColumnType {
    /// Length-bounded text column.
    String {
        /// Maximum length in characters.
        length: u32,
    },
    /// Unbounded text column.
    Text,
    /// 32-bit integer column.
    Integer,
    /// 64-bit integer column.
    BigInteger,
    /// 16-bit integer column.
    SmallInteger,
    /// Floating-point column.
    Float,
    /// Boolean column.
    Boolean,
    /// Date-time column.
    DateTime {
        /// Whether the column stores a timezone.
        timezone: bool,
    },
    /// Date column.
    Date,
    /// Time column.
    Time {
        /// Whether the column stores a timezone.
        timezone: bool,
    },
    /// JSON column.
    Json {
        /// Whether a JSON `null` is stored as SQL NULL.
        none_as_null: bool,
    },
    /// Length-bounded binary column.
    LargeBinary {
        /// Maximum length in bytes.
        length: u32,
    },
    /// Fixed-precision decimal column.
    Decimal {
        /// Total number of digits.
        precision: u32,
        /// Digits after the decimal point.
        scale: u32,
    },
    /// UUID column stored in the given textual layout.
    Uuid {
        /// Storage layout.
        format: UuidFormat,
    },
    /// Enumeration-backed column.
    Enum(EnumClass),
    /// Ciphertext column wrapping the field's plain column type.
    Encrypted {
        /// The backend producing the ciphertext.
        backend: EncryptBackendKind,
        /// The column the plaintext would have used.
        inner: Box<ColumnType>,
    },
}

impl ColumnType {
    /// Returns the declared length of length-bearing columns.
    pub const fn length(&self) -> Option<u32> {
        match self {
            Self::String { length } | Self::LargeBinary { length } => Some(*length),
            _ => None,
        }
    }

    /// Returns the `(precision, scale)` pair of decimal columns.
    pub const fn precision_scale(&self) -> Option<(u32, u32)> {
        match self {
            Self::Decimal { precision, scale } => Some((*precision, *scale)),
            _ => None,
        }
    }

    /// Returns `true` if values are stored as ciphertext.
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted { .. })
    }

    /// Returns the plaintext column type, looking through encryption.
    pub fn plain(&self) -> &Self {
        match self {
            Self::Encrypted { inner, .. } => inner.plain(),
            other => other,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String { length } => write!(f, "VARCHAR({length})"),
            Self::Text => write!(f, "TEXT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInteger => write!(f, "BIGINT"),
            Self::SmallInteger => write!(f, "SMALLINT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::DateTime { timezone: false } => write!(f, "DATETIME"),
            Self::DateTime { timezone: true } => write!(f, "DATETIME WITH TIME ZONE"),
            Self::Date => write!(f, "DATE"),
            Self::Time { timezone: false } => write!(f, "TIME"),
            Self::Time { timezone: true } => write!(f, "TIME WITH TIME ZONE"),
            Self::Json { .. } => write!(f, "JSON"),
            Self::LargeBinary { length } => write!(f, "LARGEBINARY({length})"),
            Self::Decimal { precision, scale } => write!(f, "DECIMAL({precision}, {scale})"),
            Self::Uuid { format } => write!(f, "CHAR({})", format.char_length()),
            Self::Enum(class) => write!(f, "ENUM({})", class.name),
            Self::Encrypted { backend, inner } => write!(f, "ENCRYPTED[{backend}]({inner})"),
        }
    }
}
