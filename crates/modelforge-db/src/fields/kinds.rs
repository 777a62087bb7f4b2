//! Per-kind capability records.
//!
//! Every [`FieldKind`] maps onto one static [`KindSpec`]. The factory drives
//! all kinds through the same pipeline and only calls into the record for
//! the kind-specific steps: option normalization, option validation, column
//! synthesis, validation constraints, and the sample value.

use modelforge_core::{FieldDefaults, ModelError, ModelResult, UuidFormat};

use super::descriptor::FieldConstraints;
use super::options::FieldOptions;
use super::types::{ColumnType, EnumClass, FieldKind, SemanticType};
use crate::value::Value;

/// Inputs to column synthesis.
#[derive(Debug, Clone, Copy)]
pub struct ColumnArgs<'a> {
    /// Options left after the control options were taken out.
    pub options: &'a FieldOptions,
    /// Resolved storage nullability.
    pub sql_nullable: bool,
    /// The enumeration, if one was declared.
    pub enum_class: Option<&'a EnumClass>,
}

/// The capability record of one field kind.
pub struct KindSpec {
    pub kind: FieldKind,
    /// Built-in semantic type; `None` when the type comes from `enum_class`.
    pub declared_type: Option<SemanticType>,
    pub sample: fn(Option<&EnumClass>) -> Option<Value>,
    /// Normalization applied to the raw options before validation.
    pub preprocess: fn(&mut FieldOptions, &FieldDefaults),
    pub validate: fn(&FieldOptions) -> ModelResult<()>,
    pub column_type: fn(&ColumnArgs<'_>) -> ModelResult<ColumnType>,
    pub constraints: fn(&FieldOptions) -> FieldConstraints,
    /// Overrides the semantic type based on representation options.
    pub representation: fn(&FieldOptions) -> Option<SemanticType>,
}

/// Returns the capability record of `kind`.
pub fn spec(kind: FieldKind) -> &'static KindSpec {
    match kind {
        FieldKind::String => &STRING,
        FieldKind::Text => &TEXT,
        FieldKind::Integer => &INTEGER,
        FieldKind::BigInteger => &BIG_INTEGER,
        FieldKind::SmallInteger => &SMALL_INTEGER,
        FieldKind::Float => &FLOAT,
        FieldKind::Boolean => &BOOLEAN,
        FieldKind::DateTime => &DATE_TIME,
        FieldKind::Date => &DATE,
        FieldKind::Time => &TIME,
        FieldKind::Json => &JSON,
        FieldKind::LargeBinary => &LARGE_BINARY,
        FieldKind::Decimal => &DECIMAL,
        FieldKind::Uuid => &UUID,
        FieldKind::Enum => &ENUM,
    }
}

// ── Table ──────────────────────────────────────────────────────────────

static STRING: KindSpec = KindSpec {
    kind: FieldKind::String,
    declared_type: Some(SemanticType::String),
    sample: |_| Some(Value::String("string".to_string())),
    preprocess: no_preprocess,
    validate: validate_string,
    column_type: |args| {
        Ok(ColumnType::String {
            length: positive_length(args.options.max_length, FieldKind::String)?,
        })
    },
    constraints: text_constraints,
    representation: no_representation,
};

static TEXT: KindSpec = KindSpec {
    kind: FieldKind::Text,
    declared_type: Some(SemanticType::String),
    sample: |_| Some(Value::String("text".to_string())),
    preprocess: no_preprocess,
    validate: |opts| check_regex(opts, FieldKind::Text),
    column_type: |_| Ok(ColumnType::Text),
    constraints: text_constraints,
    representation: no_representation,
};

static INTEGER: KindSpec = KindSpec {
    kind: FieldKind::Integer,
    declared_type: Some(SemanticType::Integer),
    sample: |_| Some(Value::Int(0)),
    preprocess: default_autoincrement,
    validate: no_validation,
    column_type: |_| Ok(ColumnType::Integer),
    constraints: numeric_constraints,
    representation: no_representation,
};

static BIG_INTEGER: KindSpec = KindSpec {
    kind: FieldKind::BigInteger,
    declared_type: Some(SemanticType::Integer),
    sample: |_| Some(Value::Int(0)),
    preprocess: default_autoincrement,
    validate: no_validation,
    column_type: |_| Ok(ColumnType::BigInteger),
    constraints: numeric_constraints,
    representation: no_representation,
};

static SMALL_INTEGER: KindSpec = KindSpec {
    kind: FieldKind::SmallInteger,
    declared_type: Some(SemanticType::Integer),
    sample: |_| Some(Value::Int(0)),
    preprocess: default_autoincrement,
    validate: no_validation,
    column_type: |_| Ok(ColumnType::SmallInteger),
    constraints: numeric_constraints,
    representation: no_representation,
};

static FLOAT: KindSpec = KindSpec {
    kind: FieldKind::Float,
    declared_type: Some(SemanticType::Float),
    sample: |_| Some(Value::Float(0.0)),
    preprocess: no_preprocess,
    validate: no_validation,
    column_type: |_| Ok(ColumnType::Float),
    constraints: numeric_constraints,
    representation: no_representation,
};

static BOOLEAN: KindSpec = KindSpec {
    kind: FieldKind::Boolean,
    declared_type: Some(SemanticType::Boolean),
    sample: |_| Some(Value::Bool(true)),
    preprocess: no_preprocess,
    validate: no_validation,
    column_type: |_| Ok(ColumnType::Boolean),
    constraints: no_constraints,
    representation: no_representation,
};

static DATE_TIME: KindSpec = KindSpec {
    kind: FieldKind::DateTime,
    declared_type: Some(SemanticType::DateTime),
    sample: |_| Some(Value::String("datetime".to_string())),
    preprocess: default_timezone,
    validate: no_validation,
    column_type: |args| {
        Ok(ColumnType::DateTime {
            timezone: args.options.timezone.unwrap_or(false),
        })
    },
    constraints: no_constraints,
    representation: no_representation,
};

static DATE: KindSpec = KindSpec {
    kind: FieldKind::Date,
    declared_type: Some(SemanticType::Date),
    sample: |_| Some(Value::String("date".to_string())),
    preprocess: no_preprocess,
    validate: no_validation,
    column_type: |_| Ok(ColumnType::Date),
    constraints: no_constraints,
    representation: no_representation,
};

static TIME: KindSpec = KindSpec {
    kind: FieldKind::Time,
    declared_type: Some(SemanticType::Time),
    sample: |_| Some(Value::String("time".to_string())),
    preprocess: default_timezone,
    validate: no_validation,
    column_type: |args| {
        Ok(ColumnType::Time {
            timezone: args.options.timezone.unwrap_or(false),
        })
    },
    constraints: no_constraints,
    representation: no_representation,
};

static JSON: KindSpec = KindSpec {
    kind: FieldKind::Json,
    declared_type: Some(SemanticType::Json),
    sample: |_| Some(Value::String(r#"{"json": "json"}"#.to_string())),
    preprocess: no_preprocess,
    validate: no_validation,
    column_type: |args| {
        Ok(ColumnType::Json {
            none_as_null: args.sql_nullable,
        })
    },
    constraints: no_constraints,
    representation: no_representation,
};

static LARGE_BINARY: KindSpec = KindSpec {
    kind: FieldKind::LargeBinary,
    declared_type: Some(SemanticType::Bytes),
    sample: |_| Some(Value::String("bytes".to_string())),
    preprocess: no_preprocess,
    validate: |opts| positive_length(opts.max_length, FieldKind::LargeBinary).map(|_| ()),
    column_type: |args| {
        Ok(ColumnType::LargeBinary {
            length: positive_length(args.options.max_length, FieldKind::LargeBinary)?,
        })
    },
    constraints: |opts| FieldConstraints {
        base64: is_base64(opts),
        ..FieldConstraints::default()
    },
    representation: |opts| is_base64(opts).then_some(SemanticType::String),
};

static DECIMAL: KindSpec = KindSpec {
    kind: FieldKind::Decimal,
    declared_type: Some(SemanticType::Decimal),
    sample: |_| Some(Value::Float(0.0)),
    preprocess: cross_fill_decimal,
    validate: |opts| decimal_digits(opts).map(|_| ()),
    column_type: |args| {
        let (precision, scale) = decimal_digits(args.options)?;
        Ok(ColumnType::Decimal { precision, scale })
    },
    constraints: |opts| {
        let (max_digits, decimal_places) = decimal_digits(opts)
            .map_or((None, None), |(p, s)| (Some(p), Some(s)));
        FieldConstraints {
            max_digits,
            decimal_places,
            ..numeric_constraints(opts)
        }
    },
    representation: no_representation,
};

static UUID: KindSpec = KindSpec {
    kind: FieldKind::Uuid,
    declared_type: Some(SemanticType::Uuid),
    sample: |_| Some(Value::String("uuid".to_string())),
    preprocess: |opts, defaults| {
        opts.uuid_format.get_or_insert(defaults.uuid_format);
    },
    validate: no_validation,
    column_type: |args| {
        Ok(ColumnType::Uuid {
            format: args.options.uuid_format.unwrap_or(UuidFormat::Hex),
        })
    },
    constraints: no_constraints,
    representation: no_representation,
};

static ENUM: KindSpec = KindSpec {
    kind: FieldKind::Enum,
    declared_type: None,
    sample: |class| class.and_then(|c| c.members.first()).map(|m| Value::String(m.name.clone())),
    preprocess: no_preprocess,
    validate: validate_enum,
    column_type: |args| {
        args.enum_class
            .cloned()
            .map(ColumnType::Enum)
            .ok_or_else(|| ModelError::definition("Enum Field choices must be EnumType"))
    },
    constraints: no_constraints,
    representation: no_representation,
};

// ── Shared hooks ───────────────────────────────────────────────────────

fn no_preprocess(_: &mut FieldOptions, _: &FieldDefaults) {}

fn no_validation(_: &FieldOptions) -> ModelResult<()> {
    Ok(())
}

fn no_constraints(_: &FieldOptions) -> FieldConstraints {
    FieldConstraints::default()
}

fn no_representation(_: &FieldOptions) -> Option<SemanticType> {
    None
}

/// Integer keys autoincrement unless told otherwise.
fn default_autoincrement(opts: &mut FieldOptions, _: &FieldDefaults) {
    if opts.autoincrement.is_none() {
        opts.autoincrement = Some(opts.primary_key.unwrap_or(false));
    }
}

fn default_timezone(opts: &mut FieldOptions, defaults: &FieldDefaults) {
    opts.timezone.get_or_insert(defaults.timezone);
}

/// `max_digits`/`precision` and `decimal_places`/`scale` are aliases.
/// When both spellings are given the `max_digits`/`decimal_places` value wins.
/// A zero counts as unset, so it never overrides the other spelling.
fn cross_fill_decimal(opts: &mut FieldOptions, _: &FieldDefaults) {
    let set = |v: Option<i64>| v.filter(|&n| n != 0);
    if let Some(digits) = set(opts.max_digits) {
        opts.precision = Some(digits);
    } else if let Some(precision) = set(opts.precision) {
        opts.max_digits = Some(precision);
    }
    if let Some(places) = set(opts.decimal_places) {
        opts.scale = Some(places);
    } else if let Some(scale) = set(opts.scale) {
        opts.decimal_places = Some(scale);
    }
}

fn validate_string(opts: &FieldOptions) -> ModelResult<()> {
    positive_length(opts.max_length, FieldKind::String)?;
    check_regex(opts, FieldKind::String)
}

fn validate_enum(opts: &FieldOptions) -> ModelResult<()> {
    let class = opts
        .enum_class
        .as_ref()
        .ok_or_else(|| ModelError::definition("Enum Field choices must be EnumType"))?;
    class.check().map_err(|reason| {
        ModelError::definition(format!("Enum Field choices must be EnumType: {reason}"))
    })
}

fn check_regex(opts: &FieldOptions, kind: FieldKind) -> ModelResult<()> {
    if let Some(pattern) = &opts.regex {
        regex::Regex::new(pattern).map_err(|e| {
            ModelError::definition(format!("Invalid regex for field {kind}: {e}"))
        })?;
    }
    Ok(())
}

fn positive_length(max_length: Option<i64>, kind: FieldKind) -> ModelResult<u32> {
    match max_length {
        Some(length) if length > 0 => u32::try_from(length).map_err(|_| {
            ModelError::definition(format!(
                "Parameter max_length is too large for field {kind}: {length}"
            ))
        }),
        _ => Err(ModelError::definition(format!(
            "Parameter max_length is required for field {kind}"
        ))),
    }
}

/// Returns the normalized `(precision, scale)` pair.
fn decimal_digits(opts: &FieldOptions) -> ModelResult<(u32, u32)> {
    let digits = |v: Option<i64>| v.and_then(|v| u32::try_from(v).ok());
    match (digits(opts.precision), digits(opts.scale)) {
        (Some(precision), Some(scale)) => Ok((precision, scale)),
        _ => Err(ModelError::definition(
            "Parameters scale and precision are required for field Decimal",
        )),
    }
}

fn is_base64(opts: &FieldOptions) -> bool {
    opts.represent_as_base64_str.unwrap_or(false)
}

fn text_constraints(opts: &FieldOptions) -> FieldConstraints {
    FieldConstraints {
        min_length: opts.min_length,
        max_length: opts
            .max_length
            .filter(|l| *l > 0)
            .and_then(|l| u32::try_from(l).ok()),
        regex: opts.regex.clone(),
        ..FieldConstraints::default()
    }
}

fn numeric_constraints(opts: &FieldOptions) -> FieldConstraints {
    FieldConstraints {
        ge: opts.minimum,
        le: opts.maximum,
        multiple_of: opts.multiple_of,
        ..FieldConstraints::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_matching_record() {
        for kind in FieldKind::ALL {
            assert_eq!(spec(kind).kind, kind);
        }
    }

    #[test]
    fn test_only_enum_lacks_builtin_type() {
        for kind in FieldKind::ALL {
            assert_eq!(spec(kind).declared_type.is_none(), kind == FieldKind::Enum);
        }
    }

    #[test]
    fn test_cross_fill_copies_missing_alias() {
        let mut opts = FieldOptions::new().precision(10).scale(2);
        cross_fill_decimal(&mut opts, &FieldDefaults::default());
        assert_eq!(opts.max_digits, Some(10));
        assert_eq!(opts.decimal_places, Some(2));

        let mut opts = FieldOptions::new().max_digits(8).decimal_places(3);
        cross_fill_decimal(&mut opts, &FieldDefaults::default());
        assert_eq!(opts.precision, Some(8));
        assert_eq!(opts.scale, Some(3));
    }

    #[test]
    fn test_cross_fill_prefers_max_digits() {
        let mut opts = FieldOptions::new()
            .precision(5)
            .max_digits(12)
            .scale(1)
            .decimal_places(4);
        cross_fill_decimal(&mut opts, &FieldDefaults::default());
        assert_eq!(opts.precision, Some(12));
        assert_eq!(opts.scale, Some(4));
    }

    #[test]
    fn test_cross_fill_ignores_zero_alias() {
        let mut opts = FieldOptions::new().max_digits(0).precision(10).decimal_places(2);
        cross_fill_decimal(&mut opts, &FieldDefaults::default());
        assert_eq!(opts.precision, Some(10));
        assert_eq!(opts.max_digits, Some(10));
        assert_eq!(decimal_digits(&opts).unwrap(), (10, 2));

        let mut opts = FieldOptions::new().max_digits(10).decimal_places(0);
        cross_fill_decimal(&mut opts, &FieldDefaults::default());
        assert!(decimal_digits(&opts).is_err());
    }

    #[test]
    fn test_decimal_digits_rejects_negative() {
        let opts = FieldOptions::new().precision(-1).scale(2);
        assert!(decimal_digits(&opts).is_err());
        let opts = FieldOptions::new().precision(10);
        assert!(decimal_digits(&opts).is_err());
        let opts = FieldOptions::new().precision(0).scale(0);
        assert_eq!(decimal_digits(&opts).unwrap(), (0, 0));
    }

    #[test]
    fn test_positive_length() {
        assert!(positive_length(None, FieldKind::String).is_err());
        assert!(positive_length(Some(0), FieldKind::String).is_err());
        assert!(positive_length(Some(-1), FieldKind::String).is_err());
        assert_eq!(positive_length(Some(1), FieldKind::String).unwrap(), 1);
        assert!(positive_length(Some(i64::MAX), FieldKind::LargeBinary).is_err());
    }

    #[test]
    fn test_default_autoincrement_follows_primary_key() {
        let defaults = FieldDefaults::default();
        let mut opts = FieldOptions::new().primary_key(true);
        default_autoincrement(&mut opts, &defaults);
        assert_eq!(opts.autoincrement, Some(true));

        let mut opts = FieldOptions::new();
        default_autoincrement(&mut opts, &defaults);
        assert_eq!(opts.autoincrement, Some(false));

        let mut opts = FieldOptions::new().primary_key(true).autoincrement(false);
        default_autoincrement(&mut opts, &defaults);
        assert_eq!(opts.autoincrement, Some(false));
    }

    #[test]
    fn test_settings_defaults_fill_gaps_only() {
        let defaults = FieldDefaults {
            uuid_format: UuidFormat::String,
            timezone: true,
        };
        let mut opts = FieldOptions::new();
        default_timezone(&mut opts, &defaults);
        (UUID.preprocess)(&mut opts, &defaults);
        assert_eq!(opts.timezone, Some(true));
        assert_eq!(opts.uuid_format, Some(UuidFormat::String));

        let mut opts = FieldOptions::new().timezone(false).uuid_format(UuidFormat::Hex);
        default_timezone(&mut opts, &defaults);
        (UUID.preprocess)(&mut opts, &defaults);
        assert_eq!(opts.timezone, Some(false));
        assert_eq!(opts.uuid_format, Some(UuidFormat::Hex));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let opts = FieldOptions::new().max_length(10).regex("([a-z");
        let err = validate_string(&opts).unwrap_err();
        assert!(err.to_string().contains("Invalid regex"));
    }

    #[test]
    fn test_enum_samples_first_member() {
        let class = EnumClass::new("Color").member("RED", "red").member("BLUE", "blue");
        assert_eq!((ENUM.sample)(Some(&class)), Some(Value::from("RED")));
        assert_eq!((ENUM.sample)(None), None);
    }
}
