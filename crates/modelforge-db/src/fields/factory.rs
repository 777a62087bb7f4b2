//! The descriptor construction pipeline shared by every field kind.
//!
//! [`FieldFactory::construct`] runs the same fixed sequence for every kind:
//!
//! 1. normalize the raw options (aliases, settings defaults),
//! 2. validate them, failing fast,
//! 3. take out the control options and check encryption,
//! 4. resolve nullability and storage nullability,
//! 5. pick the declared type,
//! 6. synthesize the column type from the remaining options,
//! 7. assemble the immutable descriptor.
//!
//! Kind-specific behaviour lives in the [`KindSpec`](super::kinds::KindSpec)
//! table.

use modelforge_core::{FieldDefaults, ModelError, ModelResult, Settings, SETTINGS};

use super::descriptor::FieldDescriptor;
use super::kinds::{self, ColumnArgs};
use super::options::FieldOptions;
use super::resolver::{resolve_autoincrement_optional, resolve_nullable, resolve_sql_nullable};
use super::types::{ColumnType, FieldKind, SemanticType};
use crate::encryption::EncryptionConfig;

/// Builds [`FieldDescriptor`]s.
///
/// The factory only holds the declaration defaults taken from
/// [`Settings::fields`].
///
/// # Examples
///
/// ```
/// use modelforge_db::fields::{FieldFactory, FieldKind, FieldOptions};
///
/// let factory = FieldFactory::default();
/// let id = factory
///     .construct(FieldKind::Integer, FieldOptions::new().primary_key(true))
///     .unwrap();
/// assert!(id.autoincrement());
/// assert!(id.nullable());
/// assert!(!id.sql_nullable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFactory {
    defaults: FieldDefaults,
}

impl Default for FieldFactory {
    /// Uses the global settings if they are configured, else built-in defaults.
    fn default() -> Self {
        SETTINGS
            .try_get()
            .map_or_else(|| Self::new(FieldDefaults::default()), Self::from_settings)
    }
}

impl FieldFactory {
    /// Creates a factory with explicit declaration defaults.
    pub const fn new(defaults: FieldDefaults) -> Self {
        Self { defaults }
    }

    /// Creates a factory using the field defaults of `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.fields.clone())
    }

    pub const fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    /// Constructs the descriptor of a `kind` field from its raw options.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ModelDefinition`] when a required option is
    /// missing or out of range, when the enumeration is unusable, or when
    /// the encryption options are inconsistent. No descriptor is produced
    /// on failure.
    pub fn construct(&self, kind: FieldKind, options: FieldOptions) -> ModelResult<FieldDescriptor> {
        let spec = kinds::spec(kind);
        let mut options = options;

        (spec.preprocess)(&mut options, &self.defaults);
        if let Err(err) = (spec.validate)(&options) {
            tracing::debug!(kind = %kind, error = %err, "Rejected field declaration");
            return Err(err);
        }

        let default = options.default.take();
        let server_default = options.server_default.take();
        let explicit_nullable = options.nullable.take();
        let explicit_sql_nullable = options.sql_nullable.take();
        let primary_key = options.primary_key.take().unwrap_or(false);
        let autoincrement = options.autoincrement.take().unwrap_or(false);
        let overwrite = options.overwrite_semantic_type.take();
        let index = options.index.take().unwrap_or(false);
        let unique = options.unique.take().unwrap_or(false);
        let validation_only = options.validation_only.take().unwrap_or(false);
        let alias = options.name.take();
        let enum_class = options.enum_class.take();

        let encryption = EncryptionConfig::from_options(
            kind.name(),
            options.encrypt_backend.take(),
            options.encrypt_secret.take(),
            options.encrypt_custom_backend.take(),
            primary_key,
        )?;

        let nullable = resolve_nullable(explicit_nullable, default.as_ref(), server_default.as_ref())
            || resolve_autoincrement_optional(primary_key, autoincrement);
        let sql_nullable = resolve_sql_nullable(primary_key, explicit_sql_nullable, nullable);

        let declared_type = match (&enum_class, &spec.declared_type) {
            (Some(class), _) => SemanticType::Enum(class.clone()),
            (None, Some(builtin)) => builtin.clone(),
            (None, None) => {
                return Err(ModelError::definition(format!(
                    "Field {kind} has no type without enum_class"
                )))
            }
        };

        let plain_column = (spec.column_type)(&ColumnArgs {
            options: &options,
            sql_nullable,
            enum_class: enum_class.as_ref(),
        })?;
        let column_type = match &encryption {
            Some(config) => ColumnType::Encrypted {
                backend: config.backend(),
                inner: Box::new(plain_column),
            },
            None => plain_column,
        };

        let semantic_type = overwrite
            .or_else(|| (spec.representation)(&options))
            .unwrap_or_else(|| declared_type.clone());

        tracing::debug!(
            kind = %kind,
            nullable,
            sql_nullable,
            primary_key,
            column_type = %column_type,
            "Constructed field descriptor"
        );

        Ok(FieldDescriptor {
            kind,
            sample: (spec.sample)(enum_class.as_ref()),
            constraints: (spec.constraints)(&options),
            declared_type,
            semantic_type,
            column_type,
            alias,
            primary_key,
            autoincrement,
            nullable,
            sql_nullable,
            default,
            server_default,
            index,
            unique,
            validation_only,
            encryption,
        })
    }
}

/// Constructs a descriptor with the default factory.
///
/// # Errors
///
/// See [`FieldFactory::construct`].
pub fn construct(kind: FieldKind, options: FieldOptions) -> ModelResult<FieldDescriptor> {
    FieldFactory::default().construct(kind, options)
}

impl FieldKind {
    /// Constructs a descriptor of this kind with the default factory.
    ///
    /// # Errors
    ///
    /// See [`FieldFactory::construct`].
    pub fn construct(self, options: FieldOptions) -> ModelResult<FieldDescriptor> {
        construct(self, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::EncryptBackendKind;
    use crate::fields::types::{EnumClass, Number};
    use crate::value::Value;
    use modelforge_core::UuidFormat;

    fn factory() -> FieldFactory {
        FieldFactory::new(FieldDefaults::default())
    }

    #[test]
    fn test_string_column_and_sample() {
        let d = factory()
            .construct(FieldKind::String, FieldOptions::new().max_length(250))
            .unwrap();
        assert_eq!(d.column_type(), &ColumnType::String { length: 250 });
        assert_eq!(d.semantic_type(), &SemanticType::String);
        assert_eq!(d.sample(), Some(&Value::from("string")));
        assert_eq!(d.constraints().max_length, Some(250));
        assert!(!d.nullable());
    }

    #[test]
    fn test_integer_primary_key_is_optional_but_not_sql_nullable() {
        let d = factory()
            .construct(
                FieldKind::Integer,
                FieldOptions::new().primary_key(true).nullable(false),
            )
            .unwrap();
        assert!(d.autoincrement());
        assert!(d.nullable());
        assert!(!d.sql_nullable());
    }

    #[test]
    fn test_integer_bounds_become_constraints() {
        let d = factory()
            .construct(
                FieldKind::Integer,
                FieldOptions::new().minimum(0).maximum(10).multiple_of(2),
            )
            .unwrap();
        let c = d.constraints();
        assert_eq!(c.ge, Some(Number::Int(0)));
        assert_eq!(c.le, Some(Number::Int(10)));
        assert_eq!(c.multiple_of, Some(Number::Int(2)));
        assert_eq!(d.column_type(), &ColumnType::Integer);
    }

    #[test]
    fn test_json_none_as_null_follows_sql_nullable() {
        let d = factory()
            .construct(FieldKind::Json, FieldOptions::new().nullable(true))
            .unwrap();
        assert_eq!(d.column_type(), &ColumnType::Json { none_as_null: true });
        let d = factory()
            .construct(
                FieldKind::Json,
                FieldOptions::new().nullable(true).sql_nullable(false),
            )
            .unwrap();
        assert_eq!(d.column_type(), &ColumnType::Json { none_as_null: false });
    }

    #[test]
    fn test_defaults_from_factory_settings() {
        let f = FieldFactory::new(FieldDefaults {
            uuid_format: UuidFormat::String,
            timezone: true,
        });
        let uuid = f.construct(FieldKind::Uuid, FieldOptions::new()).unwrap();
        assert_eq!(
            uuid.column_type(),
            &ColumnType::Uuid {
                format: UuidFormat::String
            }
        );
        let dt = f.construct(FieldKind::DateTime, FieldOptions::new()).unwrap();
        assert_eq!(dt.column_type(), &ColumnType::DateTime { timezone: true });
    }

    #[test]
    fn test_uuid_defaults_to_hex() {
        let d = factory().construct(FieldKind::Uuid, FieldOptions::new()).unwrap();
        assert_eq!(d.column_type().to_string(), "CHAR(32)");
    }

    #[test]
    fn test_enum_class_on_string_kind_keeps_string_column() {
        let class = EnumClass::new("Size").member("S", "s").member("L", "l");
        let d = factory()
            .construct(
                FieldKind::String,
                FieldOptions::new().max_length(1).enum_class(class.clone()),
            )
            .unwrap();
        assert_eq!(d.declared_type(), &SemanticType::Enum(class.clone()));
        assert_eq!(d.column_type(), &ColumnType::String { length: 1 });
        assert_eq!(d.enum_class(), Some(&class));
    }

    #[test]
    fn test_encrypted_column_wraps_plain_type() {
        let d = factory()
            .construct(
                FieldKind::String,
                FieldOptions::new()
                    .max_length(100)
                    .encrypt(EncryptBackendKind::Hash, "secret"),
            )
            .unwrap();
        assert!(d.is_encrypted());
        assert_eq!(d.semantic_type(), &SemanticType::String);
        assert_eq!(d.column_type().plain(), &ColumnType::String { length: 100 });
        assert_eq!(d.encryption().unwrap().secret(), "secret");
    }

    #[test]
    fn test_overwrite_semantic_type() {
        let d = factory()
            .construct(
                FieldKind::Integer,
                FieldOptions::new().overwrite_semantic_type(SemanticType::String),
            )
            .unwrap();
        assert_eq!(d.declared_type(), &SemanticType::Integer);
        assert_eq!(d.semantic_type(), &SemanticType::String);
    }

    #[test]
    fn test_validation_runs_before_encryption_checks() {
        let err = factory()
            .construct(
                FieldKind::String,
                FieldOptions::new().encrypt(EncryptBackendKind::Hash, ""),
            )
            .unwrap_err();
        assert!(err.to_string().contains("max_length"));
    }

    #[test]
    fn test_alias_and_flags_are_carried() {
        let d = factory()
            .construct(
                FieldKind::Boolean,
                FieldOptions::new()
                    .name("is_active")
                    .index(true)
                    .unique(true)
                    .default(true),
            )
            .unwrap();
        assert_eq!(d.alias(), Some("is_active"));
        assert!(d.index());
        assert!(d.unique());
        assert!(d.nullable());
        assert_eq!(d.default().unwrap().evaluate(), Value::Bool(true));
    }
}
