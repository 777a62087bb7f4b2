//! Backend-agnostic values.
//!
//! The [`Value`] enum represents attribute values, defaults, and samples. The
//! validation schema coerces raw input into the `Value` variant matching a
//! field's semantic type.

use std::fmt;

/// A backend-agnostic representation of a field value.
///
/// # Examples
///
/// ```
/// use modelforge_db::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::from("hello");
/// assert_eq!(v, Value::String("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL / an absent value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time with UTC timezone.
    DateTimeTz(chrono::DateTime<chrono::Utc>),
    /// A time without date.
    Time(chrono::NaiveTime),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// A JSON document.
    Json(serde_json::Value),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateTimeTz(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
        }
    }
}

// ── Conversions ────────────────────────────────────────────────────────

macro_rules! value_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from($v: $source) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from! {
    bool => |v| Self::Bool(v),
    i16 => |v| Self::Int(i64::from(v)),
    i32 => |v| Self::Int(i64::from(v)),
    i64 => |v| Self::Int(v),
    f32 => |v| Self::Float(f64::from(v)),
    f64 => |v| Self::Float(v),
    String => |v| Self::String(v),
    &str => |v| Self::String(v.to_owned()),
    Vec<u8> => |v| Self::Bytes(v),
    chrono::NaiveDate => |v| Self::Date(v),
    chrono::NaiveDateTime => |v| Self::DateTime(v),
    chrono::DateTime<chrono::Utc> => |v| Self::DateTimeTz(v),
    chrono::NaiveTime => |v| Self::Time(v),
    uuid::Uuid => |v| Self::Uuid(v),
    serde_json::Value => |v| Self::Json(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

/// Deserializes an untagged literal through [`Value::from_json_literal`].
///
/// Used by declaration-file fields such as `default = 0` and enum member
/// values, where the tagged `{type, value}` form would be unwieldy.
pub(crate) fn deserialize_literal<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let literal = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
    Ok(Value::from_json_literal(literal))
}

impl Value {
    /// Converts a JSON literal into the closest scalar `Value`.
    ///
    /// `null`, booleans, numbers, and strings map onto their scalar variants;
    /// arrays and objects stay JSON documents. Declaration files use this to
    /// read `default = 0` or `default = {}` without type tags.
    pub fn from_json_literal(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Json(serde_json::Value::Number(n))),
            serde_json::Value::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }

    /// Returns a short name for the variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::DateTime(_) | Self::DateTimeTz(_) => "datetime",
            Self::Time(_) => "time",
            Self::Uuid(_) => "uuid",
            Self::Json(_) => "json",
        }
    }

    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Value::from(7_i16), Value::Int(7));
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(0.5_f32), Value::Float(0.5));
        assert_eq!(Value::from(false), Value::Bool(false));
        assert_eq!(Value::from(vec![0_u8, 1]), Value::Bytes(vec![0, 1]));
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert_eq!(Value::from(None::<bool>), Value::Null);
    }

    #[test]
    fn test_temporal_and_document_conversions() {
        let date = chrono::NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        let at = date.and_hms_opt(8, 15, 0).unwrap();
        assert_eq!(Value::from(date), Value::Date(date));
        assert_eq!(Value::from(at), Value::DateTime(at));
        assert_eq!(Value::from(at.time()), Value::Time(at.time()));
        assert_eq!(Value::from(at.and_utc()), Value::DateTimeTz(at.and_utc()));

        let id = uuid::Uuid::nil();
        assert_eq!(Value::from(id), Value::Uuid(id));
        let doc = serde_json::json!({"tags": ["a"]});
        assert_eq!(Value::from(doc.clone()), Value::Json(doc));
    }

    #[test]
    fn test_from_json_literal_scalars() {
        assert_eq!(Value::from_json_literal(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json_literal(serde_json::json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json_literal(serde_json::json!(7)), Value::Int(7));
        assert_eq!(Value::from_json_literal(serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(
            Value::from_json_literal(serde_json::json!("")),
            Value::String(String::new())
        );
    }

    #[test]
    fn test_from_json_literal_documents() {
        let obj = serde_json::json!({});
        assert_eq!(Value::from_json_literal(obj.clone()), Value::Json(obj));
        let arr = serde_json::json!([1, 2]);
        assert_eq!(Value::from_json_literal(arr.clone()), Value::Json(arr));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_string(), "<3 bytes>");
        assert_eq!(Value::Json(serde_json::json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Float(0.0).type_name(), "float");
        assert_eq!(Value::Json(serde_json::json!([])).type_name(), "json");
    }

    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(Value::from(None::<i64>).is_null());
        assert!(!Value::Int(0).is_null());
        assert!(!Value::from("").is_null());
    }
}
