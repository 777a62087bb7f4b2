//! Model checks.
//!
//! A check looks at a built [`ModelSchema`] and reports field configurations
//! that are legal but almost certainly unintended. Checks never reject a
//! model; what to do with the findings is up to the caller.
//!
//! | id            | level   | finding                                    |
//! |---------------|---------|--------------------------------------------|
//! | `fields.W001` | warning | decimal scale larger than precision        |
//! | `fields.W002` | warning | encrypted field marked `index` or `unique` |
//! | `fields.E001` | error   | `min_length` above `max_length`            |
//! | `fields.W003` | warning | numeric `minimum` above `maximum`          |
//!
//! ```
//! use modelforge_db::checks::{CheckLevel, CheckRegistry};
//! use modelforge_db::fields::{FieldKind, FieldOptions};
//! use modelforge_db::model::ModelBuilder;
//!
//! let schema = ModelBuilder::new("Price")
//!     .field("id", FieldKind::Integer, FieldOptions::new().primary_key(true))
//!     .field("amount", FieldKind::Decimal, FieldOptions::new().precision(2).scale(10))
//!     .build()
//!     .unwrap();
//!
//! let messages = CheckRegistry::with_builtins().run(&schema, &[]);
//! assert_eq!(messages[0].id, "fields.W001");
//! assert_eq!(messages[0].object, "Price.amount");
//! assert_eq!(messages[0].level, CheckLevel::Warning);
//! ```

use std::fmt;

use crate::fields::FieldDescriptor;
use crate::model::ModelSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckLevel {
    Warning,
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One finding reported by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    pub level: CheckLevel,
    /// Stable identifier such as `fields.W001`.
    pub id: &'static str,
    /// The offending field as `Model.attribute`.
    pub object: String,
    pub msg: String,
    pub hint: Option<&'static str>,
}

impl CheckMessage {
    pub fn warning(id: &'static str, object: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            level: CheckLevel::Warning,
            id,
            object: object.into(),
            msg: msg.into(),
            hint: None,
        }
    }

    pub fn error(id: &'static str, object: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            level: CheckLevel::Error,
            ..Self::warning(id, object, msg)
        }
    }

    #[must_use]
    pub const fn with_hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == CheckLevel::Error
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}) {}: {}", self.object, self.id, self.level, self.msg)?;
        if let Some(hint) = self.hint {
            write!(f, " Hint: {hint}")?;
        }
        Ok(())
    }
}

pub type CheckFn = fn(&ModelSchema) -> Vec<CheckMessage>;

const BUILTINS: [(CheckFn, &[&str]); 4] = [
    (check_decimal_scale, &["fields"]),
    (check_encrypted_lookup, &["fields", "security"]),
    (check_length_bounds, &["fields"]),
    (check_numeric_bounds, &["fields"]),
];

/// An ordered set of checks, each carrying the tags it can be selected by.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    checks: Vec<(CheckFn, Vec<&'static str>)>,
}

impl CheckRegistry {
    pub const fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// A registry holding the `fields.*` checks shipped with the crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (check, tags) in BUILTINS {
            registry.register(check, tags);
        }
        registry
    }

    pub fn register(&mut self, check: CheckFn, tags: &[&'static str]) {
        self.checks.push((check, tags.to_vec()));
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs the checks sharing at least one tag with `tags` against `schema`.
    /// An empty `tags` slice selects every check.
    pub fn run(&self, schema: &ModelSchema, tags: &[&str]) -> Vec<CheckMessage> {
        let messages: Vec<CheckMessage> = self
            .checks
            .iter()
            .filter(|(_, own)| tags.is_empty() || own.iter().any(|t| tags.contains(t)))
            .flat_map(|(check, _)| check(schema))
            .collect();
        for message in &messages {
            tracing::debug!(model = schema.name(), %message, "Model check finding");
        }
        messages
    }
}

fn each_field<F>(schema: &ModelSchema, mut inspect: F) -> Vec<CheckMessage>
where
    F: FnMut(String, &FieldDescriptor) -> Option<CheckMessage>,
{
    schema
        .fields()
        .filter_map(|(attribute, descriptor)| {
            inspect(format!("{}.{attribute}", schema.name()), &**descriptor)
        })
        .collect()
}

fn check_decimal_scale(schema: &ModelSchema) -> Vec<CheckMessage> {
    each_field(schema, |object, d| {
        let (precision, scale) = d.column_type().plain().precision_scale()?;
        (scale > precision).then(|| {
            CheckMessage::warning(
                "fields.W001",
                object,
                format!("Decimal scale {scale} is greater than precision {precision}."),
            )
            .with_hint("Most databases reject a scale larger than the precision.")
        })
    })
}

fn check_encrypted_lookup(schema: &ModelSchema) -> Vec<CheckMessage> {
    each_field(schema, |object, d| {
        (d.is_encrypted() && (d.index() || d.unique())).then(|| {
            CheckMessage::warning("fields.W002", object, "Encrypted field is marked index or unique.")
                .with_hint("Indexes and unique constraints apply to the ciphertext, not the plain value.")
        })
    })
}

fn check_length_bounds(schema: &ModelSchema) -> Vec<CheckMessage> {
    each_field(schema, |object, d| {
        let c = d.constraints();
        let (min, max) = (c.min_length?, c.max_length?);
        (min > max).then(|| {
            CheckMessage::error(
                "fields.E001",
                object,
                format!("min_length {min} is greater than max_length {max}."),
            )
            .with_hint("No value can satisfy both bounds.")
        })
    })
}

fn check_numeric_bounds(schema: &ModelSchema) -> Vec<CheckMessage> {
    each_field(schema, |object, d| {
        if !d.kind().is_numeric() {
            return None;
        }
        let c = d.constraints();
        let (ge, le) = (c.ge?, c.le?);
        (ge.as_f64() > le.as_f64()).then(|| {
            CheckMessage::warning(
                "fields.W003",
                object,
                format!("minimum {ge} is greater than maximum {le}."),
            )
            .with_hint("No value can satisfy both bounds.")
        })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::encryption::EncryptBackendKind;
    use crate::fields::{FieldKind, FieldOptions};
    use crate::model::ModelBuilder;

    fn schema_with(kind: FieldKind, options: FieldOptions) -> Arc<ModelSchema> {
        ModelBuilder::new("Item")
            .field("id", FieldKind::Integer, FieldOptions::new().primary_key(true))
            .field("value", kind, options)
            .build()
            .unwrap()
    }

    fn ids(messages: &[CheckMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_message_display() {
        let m = CheckMessage::warning("fields.W001", "Item.value", "msg").with_hint("hint");
        assert_eq!(m.to_string(), "Item.value: (fields.W001) warning: msg Hint: hint");
        assert!(!m.is_error());

        let e = CheckMessage::error("fields.E001", "Item.value", "bad");
        assert_eq!(e.to_string(), "Item.value: (fields.E001) error: bad");
        assert!(e.is_error());
        assert!(CheckLevel::Warning < CheckLevel::Error);
    }

    #[test]
    fn test_decimal_scale_warning() {
        let schema = schema_with(FieldKind::Decimal, FieldOptions::new().precision(2).scale(10));
        let messages = CheckRegistry::with_builtins().run(&schema, &[]);
        assert_eq!(ids(&messages), vec!["fields.W001"]);
        assert_eq!(messages[0].object, "Item.value");

        let schema = schema_with(FieldKind::Decimal, FieldOptions::new().precision(10).scale(2));
        assert!(CheckRegistry::with_builtins().run(&schema, &[]).is_empty());
    }

    #[test]
    fn test_encrypted_index_warning() {
        let schema = schema_with(
            FieldKind::String,
            FieldOptions::new()
                .max_length(20)
                .unique(true)
                .encrypt(EncryptBackendKind::Hash, "k"),
        );
        let registry = CheckRegistry::with_builtins();
        assert_eq!(ids(&registry.run(&schema, &[])), vec!["fields.W002"]);
        assert_eq!(ids(&registry.run(&schema, &["security"])), vec!["fields.W002"]);
    }

    #[test]
    fn test_length_bounds_error() {
        let schema = schema_with(FieldKind::String, FieldOptions::new().max_length(5).min_length(8));
        let messages = CheckRegistry::with_builtins().run(&schema, &[]);
        assert_eq!(ids(&messages), vec!["fields.E001"]);
        assert!(messages[0].is_error());
    }

    #[test]
    fn test_numeric_bounds_warning() {
        let schema = schema_with(FieldKind::Float, FieldOptions::new().minimum(5.0).maximum(1));
        let messages = CheckRegistry::with_builtins().run(&schema, &[]);
        assert_eq!(ids(&messages), vec!["fields.W003"]);
    }

    #[test]
    fn test_tag_filtering() {
        let schema = schema_with(FieldKind::Decimal, FieldOptions::new().precision(2).scale(10));
        let registry = CheckRegistry::with_builtins();
        assert_eq!(registry.len(), 4);
        assert!(registry.run(&schema, &["security"]).is_empty());
        assert_eq!(ids(&registry.run(&schema, &["fields"])), vec!["fields.W001"]);
        assert!(CheckRegistry::new().is_empty());
    }

    #[test]
    fn test_custom_check() {
        fn no_text(schema: &ModelSchema) -> Vec<CheckMessage> {
            each_field(schema, |object, d| {
                (d.kind() == FieldKind::Text)
                    .then(|| CheckMessage::warning("app.W001", object, "Text column"))
            })
        }
        let mut registry = CheckRegistry::new();
        registry.register(no_text, &["app"]);
        let schema = schema_with(FieldKind::Text, FieldOptions::new());
        let messages = registry.run(&schema, &["app"]);
        assert_eq!(ids(&messages), vec!["app.W001"]);
        assert_eq!(messages[0].object, "Item.value");
        assert!(registry.run(&schema, &["fields"]).is_empty());
    }
}
