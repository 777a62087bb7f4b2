//! Value validators.
//!
//! Each validator checks one constraint on an already coerced value and
//! reports a [`ValidationError`] when the value does not satisfy it.
//! [`validators_for`] builds the validator list of a field from its
//! [`FieldConstraints`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use modelforge_core::ValidationError;

use crate::fields::{FieldConstraints, Number};
use crate::value::Value;

/// A single value constraint.
///
/// # Examples
///
/// ```
/// use modelforge_db::validators::{MaxLengthValidator, Validator};
/// use modelforge_db::value::Value;
///
/// let v = MaxLengthValidator::new(5);
/// assert!(v.validate(&Value::String("hi".into())).is_ok());
/// assert!(v.validate(&Value::String("toolong".into())).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// Validates that a string value does not exceed a maximum length.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    /// The maximum allowed length in characters.
    pub max_length: usize,
}

impl MaxLengthValidator {
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            let len = s.chars().count();
            if len > self.max_length {
                return Err(ValidationError::new(
                    format!(
                        "Ensure this value has at most {} characters (it has {len}).",
                        self.max_length
                    ),
                    "max_length",
                )
                .with_param("max_length", self.max_length.to_string()));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxLengthValidator"
    }
}

/// Validates that a string value meets a minimum length requirement.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    /// The minimum required length in characters.
    pub min_length: usize,
}

impl MinLengthValidator {
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            let len = s.chars().count();
            if len < self.min_length {
                return Err(ValidationError::new(
                    format!(
                        "Ensure this value has at least {} characters (it has {len}).",
                        self.min_length
                    ),
                    "min_length",
                )
                .with_param("min_length", self.min_length.to_string()));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinLengthValidator"
    }
}

/// Compares a numeric value against a bound.
///
/// Integers compare exactly against integer bounds. Decimal text is parsed.
#[allow(clippy::cast_precision_loss)]
fn compare(value: &Value, bound: Number) -> Option<Ordering> {
    match (value, bound) {
        (Value::Int(v), Number::Int(b)) => Some(v.cmp(&b)),
        (Value::Int(v), Number::Float(b)) => (*v as f64).partial_cmp(&b),
        (Value::Float(v), b) => v.partial_cmp(&b.as_f64()),
        (Value::String(s), b) => s.trim().parse::<f64>().ok()?.partial_cmp(&b.as_f64()),
        _ => None,
    }
}

/// Validates that a numeric value does not exceed a maximum.
#[derive(Debug, Clone)]
pub struct MaxValueValidator {
    /// The maximum allowed value (inclusive).
    pub max_value: Number,
}

impl MaxValueValidator {
    pub fn new(max_value: impl Into<Number>) -> Self {
        Self {
            max_value: max_value.into(),
        }
    }
}

impl Validator for MaxValueValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if compare(value, self.max_value) == Some(Ordering::Greater) {
            return Err(ValidationError::new(
                format!(
                    "Ensure this value is less than or equal to {}.",
                    self.max_value
                ),
                "max_value",
            )
            .with_param("le", self.max_value.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxValueValidator"
    }
}

/// Validates that a numeric value meets a minimum requirement.
#[derive(Debug, Clone)]
pub struct MinValueValidator {
    /// The minimum required value (inclusive).
    pub min_value: Number,
}

impl MinValueValidator {
    pub fn new(min_value: impl Into<Number>) -> Self {
        Self {
            min_value: min_value.into(),
        }
    }
}

impl Validator for MinValueValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if compare(value, self.min_value) == Some(Ordering::Less) {
            return Err(ValidationError::new(
                format!(
                    "Ensure this value is greater than or equal to {}.",
                    self.min_value
                ),
                "min_value",
            )
            .with_param("ge", self.min_value.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinValueValidator"
    }
}

/// Validates that a numeric value is a multiple of a step.
///
/// A zero step accepts every value.
#[derive(Debug, Clone)]
pub struct MultipleOfValidator {
    pub step: Number,
}

impl MultipleOfValidator {
    pub fn new(step: impl Into<Number>) -> Self {
        Self { step: step.into() }
    }

    #[allow(clippy::cast_precision_loss)]
    fn is_multiple(&self, value: &Value) -> bool {
        let v = match (value, self.step) {
            (_, Number::Int(0)) => return true,
            (Value::Int(v), Number::Int(step)) => {
                return v.checked_rem(step).map_or(true, |r| r == 0)
            }
            (Value::Int(v), _) => *v as f64,
            (Value::Float(v), _) => *v,
            (Value::String(s), _) => match s.trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => return true,
            },
            _ => return true,
        };
        let step = self.step.as_f64();
        if step == 0.0 {
            return true;
        }
        let quotient = v / step;
        (quotient - quotient.round()).abs() < 1e-9
    }
}

impl Validator for MultipleOfValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if self.is_multiple(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                format!("Ensure this value is a multiple of {}.", self.step),
                "multiple_of",
            )
            .with_param("multiple_of", self.step.to_string()))
        }
    }

    fn name(&self) -> &str {
        "MultipleOfValidator"
    }
}

/// Validates that a string value matches a pattern.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pub regex: regex::Regex,
}

impl RegexValidator {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the compile error of an invalid pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: regex::Regex::new(pattern)?,
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            if !self.regex.is_match(s) {
                return Err(ValidationError::new(
                    format!("String should match pattern '{}'.", self.regex.as_str()),
                    "pattern_mismatch",
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RegexValidator"
    }
}

/// Digit counts of a decimal literal.
struct DecimalShape {
    /// Significant digits in total.
    digits: usize,
    /// Digits after the decimal point, trailing zeros excluded.
    places: usize,
}

impl DecimalShape {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }
        let fraction = fraction.trim_end_matches('0');
        let whole = whole.trim_start_matches('0');
        Some(Self {
            digits: whole.len() + fraction.len(),
            places: fraction.len(),
        })
    }
}

/// Returns `true` if `text` is a plain decimal literal such as `-12.50`.
pub fn is_decimal_literal(text: &str) -> bool {
    DecimalShape::parse(text).is_some()
}

/// Validates the digit counts of decimal text.
#[derive(Debug, Clone)]
pub struct DecimalDigitsValidator {
    pub max_digits: Option<u32>,
    pub decimal_places: Option<u32>,
}

impl DecimalDigitsValidator {
    pub const fn new(max_digits: Option<u32>, decimal_places: Option<u32>) -> Self {
        Self {
            max_digits,
            decimal_places,
        }
    }
}

impl Validator for DecimalDigitsValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(text) = value else {
            return Ok(());
        };
        let Some(shape) = DecimalShape::parse(text) else {
            return Err(ValidationError::new(
                "Input should be a valid decimal.",
                "decimal_parsing",
            ));
        };
        let max_digits = self.max_digits.map(|d| d as usize);
        let places = self.decimal_places.map(|d| d as usize);
        if let Some(max) = max_digits {
            if shape.digits > max {
                return Err(ValidationError::new(
                    format!("Ensure that there are no more than {max} digits in total."),
                    "decimal_max_digits",
                ));
            }
        }
        if let Some(max) = places {
            if shape.places > max {
                return Err(ValidationError::new(
                    format!("Ensure that there are no more than {max} decimal places."),
                    "decimal_max_places",
                ));
            }
        }
        // A scale above the precision leaves no whole-digit budget to check.
        if let (Some(digits), Some(places)) = (max_digits, places) {
            let whole_max = digits.saturating_sub(places);
            if places <= digits && shape.digits - shape.places > whole_max {
                return Err(ValidationError::new(
                    format!(
                        "Ensure that there are no more than {whole_max} digits before the decimal point."
                    ),
                    "decimal_whole_digits",
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DecimalDigitsValidator"
    }
}

/// Validates that a string value is standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Validator;

impl Validator for Base64Validator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            if STANDARD.decode(s).is_err() {
                return Err(ValidationError::new(
                    "Input should be a valid base64 string.",
                    "base64_decode",
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Base64Validator"
    }
}

/// Builds the validators enforcing `constraints`.
///
/// A regex that fails to compile is skipped; the factory rejects such
/// declarations before a descriptor exists.
pub fn validators_for(constraints: &FieldConstraints) -> Vec<Arc<dyn Validator>> {
    let mut validators: Vec<Arc<dyn Validator>> = Vec::new();
    if let Some(min) = constraints.min_length {
        validators.push(Arc::new(MinLengthValidator::new(min as usize)));
    }
    if let Some(max) = constraints.max_length {
        validators.push(Arc::new(MaxLengthValidator::new(max as usize)));
    }
    if let Some(pattern) = &constraints.regex {
        if let Ok(v) = RegexValidator::new(pattern) {
            validators.push(Arc::new(v));
        }
    }
    if let Some(ge) = constraints.ge {
        validators.push(Arc::new(MinValueValidator::new(ge)));
    }
    if let Some(le) = constraints.le {
        validators.push(Arc::new(MaxValueValidator::new(le)));
    }
    if let Some(step) = constraints.multiple_of {
        validators.push(Arc::new(MultipleOfValidator::new(step)));
    }
    if constraints.max_digits.is_some() || constraints.decimal_places.is_some() {
        validators.push(Arc::new(DecimalDigitsValidator::new(
            constraints.max_digits,
            constraints.decimal_places,
        )));
    }
    if constraints.base64 {
        validators.push(Arc::new(Base64Validator));
    }
    validators
}
