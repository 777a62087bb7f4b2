//! The validation schema derived from a model's field descriptors.
//!
//! [`ValidationSchema`] holds one [`FieldValidator`] per attribute. A field
//! validator coerces raw input into the [`Value`] variant matching the
//! field's semantic type and then runs the constraint validators.
//!
//! Coercion rules per semantic type:
//!
//! | Semantic type | Accepted input | Result |
//! |---|---|---|
//! | string | string; bytes when base64 | `String` |
//! | integer | int, integral float, numeric string | `Int` |
//! | float | float, int, numeric string | `Float` |
//! | decimal | int, finite float, decimal string | `String` (decimal text) |
//! | boolean | bool, 0/1, "true"/"false"/"yes"/"no"/"on"/"off" | `Bool` |
//! | datetime | datetime, RFC 3339 or ISO 8601 string | `DateTime`/`DateTimeTz` |
//! | date | date, `YYYY-MM-DD` string | `Date` |
//! | time | time, `HH:MM[:SS[.f]]` string | `Time` |
//! | json | JSON, JSON text, bool, number | `Json` |
//! | bytes | bytes, string | `Bytes` |
//! | uuid | uuid, hyphenated or simple string | `Uuid` |
//! | enum | member name or member value | `String` (member name) |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use modelforge_core::ValidationError;

use crate::fields::{DefaultValue, FieldConstraints, FieldDescriptor, SemanticType};
use crate::validators::{is_decimal_literal, validators_for, Validator};
use crate::value::Value;

/// Validator of one model attribute.
#[derive(Clone)]
pub struct FieldValidator {
    /// The attribute name.
    pub attribute: String,
    /// The type values are coerced to.
    pub semantic_type: SemanticType,
    /// `false` when the attribute may be omitted or null.
    pub required: bool,
    /// Applied when the attribute is omitted.
    pub default: Option<DefaultValue>,
    pub constraints: FieldConstraints,
    validators: Vec<Arc<dyn Validator>>,
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("attribute", &self.attribute)
            .field("semantic_type", &self.semantic_type)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

impl FieldValidator {
    /// Derives the validator of `attribute` from its descriptor.
    pub fn from_descriptor(attribute: &str, descriptor: &FieldDescriptor) -> Self {
        let constraints = descriptor.constraints().clone();
        Self {
            attribute: attribute.to_string(),
            semantic_type: descriptor.semantic_type().clone(),
            required: !descriptor.nullable(),
            default: descriptor.default().cloned(),
            validators: validators_for(&constraints),
            constraints,
        }
    }

    /// Coerces `value` and checks every constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the value cannot be coerced to the
    /// semantic type, is null for a required field, or breaks a constraint.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_null() {
            if self.required {
                return Err(ValidationError::new(
                    "This field cannot be null.",
                    "null",
                ));
            }
            return Ok(Value::Null);
        }
        let coerced = self.coerce(value)?;
        for validator in &self.validators {
            validator.validate(&coerced)?;
        }
        Ok(coerced)
    }

    /// Returns the value of an omitted attribute, if it may be omitted.
    fn omitted(&self) -> Option<Value> {
        match &self.default {
            Some(default) if default.is_present() => Some(default.evaluate()),
            _ if !self.required => Some(Value::Null),
            _ => None,
        }
    }

    fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        match &self.semantic_type {
            SemanticType::String => self.coerce_string(value),
            SemanticType::Integer => coerce_integer(value),
            SemanticType::Float => coerce_float(value),
            SemanticType::Decimal => coerce_decimal(value),
            SemanticType::Boolean => coerce_bool(value),
            SemanticType::DateTime => coerce_datetime(value),
            SemanticType::Date => coerce_date(value),
            SemanticType::Time => coerce_time(value),
            SemanticType::Json => coerce_json(value),
            SemanticType::Bytes => coerce_bytes(value),
            SemanticType::Uuid => coerce_uuid(value),
            SemanticType::Enum(class) => class
                .find(value)
                .map(|member| Value::String(member.name.clone()))
                .ok_or_else(|| {
                    ValidationError::new(
                        format!("Input should be one of: {}.", class.names().join(", ")),
                        "enum",
                    )
                }),
        }
    }

    fn coerce_string(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Bytes(b) if self.constraints.base64 => Ok(Value::String(STANDARD.encode(b))),
            other => Err(type_error("a valid string", other)),
        }
    }
}

fn type_error(expected: &str, value: &Value) -> ValidationError {
    ValidationError::new(
        format!("Input should be {expected}, got {}.", value.type_name()),
        "type",
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn coerce_integer(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(Value::Int(*f as i64))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| type_error("a valid integer", value)),
        other => Err(type_error("a valid integer", other)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn coerce_float(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| type_error("a valid number", value)),
        other => Err(type_error("a valid number", other)),
    }
}

fn coerce_decimal(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Int(i) => Ok(Value::String(i.to_string())),
        Value::Float(f) if f.is_finite() => Ok(Value::String(f.to_string())),
        Value::String(s) if is_decimal_literal(s) => Ok(Value::String(s.trim().to_string())),
        other => Err(type_error("a valid decimal", other)),
    }
}

fn coerce_bool(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "y" | "t" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" | "n" | "f" => Ok(Value::Bool(false)),
            _ => Err(type_error("a valid boolean", value)),
        },
        other => Err(type_error("a valid boolean", other)),
    }
}

fn coerce_datetime(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::DateTimeTz(dt) => Ok(Value::DateTimeTz(*dt)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                return Ok(Value::DateTimeTz(dt.with_timezone(&chrono::Utc)));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(Value::DateTime)
                .ok_or_else(|| type_error("a valid datetime", value))
        }
        other => Err(type_error("a valid datetime", other)),
    }
}

fn coerce_date(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::String(s) => chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| type_error("a valid date", value)),
        other => Err(type_error("a valid date", other)),
    }
}

fn coerce_time(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::String(s) => {
            let s = s.trim();
            ["%H:%M:%S%.f", "%H:%M"]
                .iter()
                .find_map(|fmt| chrono::NaiveTime::parse_from_str(s, fmt).ok())
                .map(Value::Time)
                .ok_or_else(|| type_error("a valid time", value))
        }
        other => Err(type_error("a valid time", other)),
    }
}

fn coerce_json(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Json(j) => Ok(Value::Json(j.clone())),
        Value::String(s) => serde_json::from_str(s).map(Value::Json).map_err(|e| {
            ValidationError::new(format!("Invalid JSON: {e}"), "json_invalid")
        }),
        Value::Bool(b) => Ok(Value::Json(serde_json::Value::Bool(*b))),
        Value::Int(i) => Ok(Value::Json(serde_json::Value::from(*i))),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(|n| Value::Json(serde_json::Value::Number(n)))
            .ok_or_else(|| not_serializable(value)),
        other => Err(not_serializable(other)),
    }
}

fn not_serializable(value: &Value) -> ValidationError {
    ValidationError::new(
        format!("Input of type {} is not JSON serializable.", value.type_name()),
        "json_type",
    )
}

fn coerce_bytes(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
        Value::String(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
        other => Err(type_error("valid bytes", other)),
    }
}

fn coerce_uuid(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Uuid(u) => Ok(Value::Uuid(*u)),
        Value::String(s) => uuid::Uuid::parse_str(s.trim())
            .map(Value::Uuid)
            .map_err(|_| type_error("a valid UUID", value)),
        other => Err(type_error("a valid UUID", other)),
    }
}

/// The validation schema of a model: one validator per attribute, in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    pub fields: Vec<FieldValidator>,
}

impl ValidationSchema {
    /// Builds the schema from `(attribute, descriptor)` pairs.
    pub fn from_descriptors<'a, I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a FieldDescriptor)>,
    {
        Self {
            fields: descriptors
                .into_iter()
                .map(|(attribute, d)| FieldValidator::from_descriptor(attribute, d))
                .collect(),
        }
    }

    /// Returns the validator of `attribute`.
    pub fn field(&self, attribute: &str) -> Option<&FieldValidator> {
        self.fields.iter().find(|f| f.attribute == attribute)
    }

    /// Validates a whole input record.
    ///
    /// Omitted attributes take their default, or null when they are not
    /// required. All failures are reported together, keyed by attribute.
    ///
    /// # Errors
    ///
    /// Returns a compound [`ValidationError`] when an attribute is unknown,
    /// missing, or invalid.
    pub fn validate(
        &self,
        mut input: HashMap<String, Value>,
    ) -> Result<Vec<(String, Value)>, ValidationError> {
        let mut errors: HashMap<String, Vec<ValidationError>> = HashMap::new();
        let mut values = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let result = match input.remove(&field.attribute) {
                Some(raw) => field.validate(&raw),
                None => field
                    .omitted()
                    .ok_or_else(|| ValidationError::new("Field required.", "required")),
            };
            match result {
                Ok(value) => values.push((field.attribute.clone(), value)),
                Err(err) => errors.entry(field.attribute.clone()).or_default().push(err),
            }
        }
        for unknown in input.into_keys() {
            errors.entry(unknown).or_default().push(ValidationError::new(
                "Extra inputs are not permitted.",
                "extra_forbidden",
            ));
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            Err(ValidationError::with_field_errors(errors))
        }
    }
}
