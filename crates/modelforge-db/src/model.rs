//! Model assembly.
//!
//! A model is declared once, either in code with [`ModelBuilder`] or from a
//! TOML/JSON [`ModelDeclaration`]. Building it constructs every field
//! descriptor, enforces the model-level rules (exactly one primary key,
//! unique attribute and column names), and produces a [`ModelSchema`]
//! holding both the physical [`TableSchema`] and the [`ValidationSchema`].
//!
//! # Examples
//!
//! ```
//! use modelforge_db::fields::{FieldKind, FieldOptions};
//! use modelforge_db::model::ModelBuilder;
//!
//! let schema = ModelBuilder::new("Album")
//!     .field("id", FieldKind::Integer, FieldOptions::new().primary_key(true))
//!     .field("name", FieldKind::String, FieldOptions::new().max_length(100))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.tablename(), "albums");
//! assert_eq!(schema.pk_name(), "id");
//! assert_eq!(schema.table().columns.len(), 2);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use modelforge_core::logging::declaration_span;
use modelforge_core::{ModelError, ModelResult, ValidationError};
use serde::Deserialize;

use crate::fields::{ColumnType, DefaultValue, FieldDescriptor, FieldFactory, FieldKind, FieldOptions};
use crate::schema::ValidationSchema;
use crate::value::Value;

/// Alias every model accepts for its primary-key attribute.
pub const PK_ALIAS: &str = "pk";

enum FieldSource {
    Declared(FieldKind, FieldOptions),
    Built(FieldDescriptor),
}

/// Declares a model field by field.
pub struct ModelBuilder {
    name: String,
    tablename: Option<String>,
    factory: Option<FieldFactory>,
    fields: Vec<(String, FieldSource)>,
}

impl ModelBuilder {
    /// Starts a model declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tablename: None,
            factory: None,
            fields: Vec::new(),
        }
    }

    /// Sets the table name. Defaults to the lowercased model name plus `s`.
    #[must_use]
    pub fn tablename(mut self, tablename: impl Into<String>) -> Self {
        self.tablename = Some(tablename.into());
        self
    }

    /// Uses `factory` instead of the default one.
    #[must_use]
    pub fn with_factory(mut self, factory: FieldFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Declares a field to be constructed at build time.
    #[must_use]
    pub fn field(mut self, attribute: impl Into<String>, kind: FieldKind, options: FieldOptions) -> Self {
        self.fields
            .push((attribute.into(), FieldSource::Declared(kind, options)));
        self
    }

    /// Adds an already constructed descriptor.
    #[must_use]
    pub fn descriptor(mut self, attribute: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields
            .push((attribute.into(), FieldSource::Built(descriptor)));
        self
    }

    /// Constructs every field and assembles the model schema.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ModelDefinition`] naming the model and attribute
    /// when a field is invalid, and when the model has no primary key, more
    /// than one, or repeats an attribute or column name. A validation-only
    /// primary key is rejected as well.
    pub fn build(self) -> ModelResult<Arc<ModelSchema>> {
        let span = declaration_span(&self.name);
        let _guard = span.enter();

        let factory = self.factory.unwrap_or_default();
        let model = self.name;
        let mut fields: Vec<(String, Arc<FieldDescriptor>)> = Vec::with_capacity(self.fields.len());
        let mut attributes = HashSet::new();

        for (attribute, source) in self.fields {
            if attribute == PK_ALIAS {
                return Err(ModelError::definition(format!(
                    "{model}.{attribute}: '{PK_ALIAS}' is reserved for the primary key alias"
                )));
            }
            if !attributes.insert(attribute.clone()) {
                return Err(ModelError::definition(format!(
                    "{model}.{attribute}: duplicate field name"
                )));
            }
            let descriptor = match source {
                FieldSource::Declared(kind, options) => {
                    factory.construct(kind, options).map_err(|err| match err {
                        ModelError::ModelDefinition(msg) => {
                            ModelError::definition(format!("{model}.{attribute}: {msg}"))
                        }
                        other => other,
                    })?
                }
                FieldSource::Built(descriptor) => descriptor,
            };
            fields.push((attribute, Arc::new(descriptor)));
        }

        let mut keys = fields.iter().filter(|(_, d)| d.primary_key());
        let (pk, pk_field) = match (keys.next(), keys.next()) {
            (Some((name, d)), None) if d.validation_only() => {
                return Err(ModelError::definition(format!(
                    "{model}.{name}: primary key column cannot be validation only"
                )))
            }
            (Some((name, d)), None) => (name.clone(), Arc::clone(d)),
            (None, _) => {
                return Err(ModelError::definition(format!(
                    "Table {model} has to have a primary key"
                )))
            }
            (Some(_), Some(_)) => {
                return Err(ModelError::definition(format!(
                    "Only one primary key column is allowed in {model}"
                )))
            }
        };

        let tablename = self
            .tablename
            .unwrap_or_else(|| format!("{}s", model.to_lowercase()));
        let table = TableSchema::from_fields(&tablename, &fields)?;
        let validation =
            ValidationSchema::from_descriptors(fields.iter().map(|(a, d)| (a.as_str(), d.as_ref())));

        tracing::debug!(
            model = %model,
            table = %tablename,
            fields = fields.len(),
            pk = %pk,
            "Declared model"
        );

        Ok(Arc::new(ModelSchema {
            name: model,
            tablename,
            fields,
            pk,
            pk_field,
            table,
            validation,
        }))
    }
}

/// A declared model: its descriptors, table, and validation schema.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    tablename: String,
    fields: Vec<(String, Arc<FieldDescriptor>)>,
    pk: String,
    pk_field: Arc<FieldDescriptor>,
    table: TableSchema,
    validation: ValidationSchema,
}

impl ModelSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tablename(&self) -> &str {
        &self.tablename
    }

    /// Iterates over `(attribute, descriptor)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<FieldDescriptor>)> {
        self.fields.iter().map(|(a, d)| (a.as_str(), d))
    }

    /// Returns the descriptor of `attribute`, resolving the `pk` alias.
    pub fn field(&self, attribute: &str) -> Option<&Arc<FieldDescriptor>> {
        let attribute = self.resolve(attribute);
        self.fields
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, d)| d)
    }

    /// The primary-key attribute name.
    pub fn pk_name(&self) -> &str {
        &self.pk
    }

    /// The primary-key descriptor.
    pub const fn pk_field(&self) -> &Arc<FieldDescriptor> {
        &self.pk_field
    }

    pub const fn table(&self) -> &TableSchema {
        &self.table
    }

    pub const fn validation(&self) -> &ValidationSchema {
        &self.validation
    }

    fn resolve<'a>(&'a self, attribute: &'a str) -> &'a str {
        if attribute == PK_ALIAS {
            &self.pk
        } else {
            attribute
        }
    }

    /// Validates `input` and creates an instance.
    ///
    /// The `pk` key is accepted as an alias for the primary-key attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] with one entry per failing attribute.
    pub fn instantiate(self: &Arc<Self>, input: HashMap<String, Value>) -> ModelResult<ModelInstance> {
        let input = input
            .into_iter()
            .map(|(key, value)| (self.resolve(&key).to_string(), value))
            .collect();
        let values = self.validation.validate(input)?;
        Ok(ModelInstance {
            schema: Arc::clone(self),
            values,
        })
    }
}

/// One column of a physical table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// The attribute the column stores.
    pub attribute: String,
    pub column_type: ColumnType,
    /// Storage nullability (the descriptor's `sql_nullable`).
    pub nullable: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub index: bool,
    pub unique: bool,
    pub server_default: Option<DefaultValue>,
}

/// The physical table of a model.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    fn from_fields(name: &str, fields: &[(String, Arc<FieldDescriptor>)]) -> ModelResult<Self> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(fields.len());
        for (attribute, d) in fields.iter().filter(|(_, d)| !d.validation_only()) {
            let column_name = d.column_name(attribute);
            if !seen.insert(column_name.to_string()) {
                return Err(ModelError::definition(format!(
                    "Table {name} repeats column name {column_name}"
                )));
            }
            columns.push(Column {
                name: column_name.to_string(),
                attribute: attribute.clone(),
                column_type: d.column_type().clone(),
                nullable: d.sql_nullable(),
                primary_key: d.primary_key(),
                autoincrement: d.autoincrement(),
                index: d.index(),
                unique: d.unique(),
                server_default: d.server_default().cloned(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            columns,
        })
    }

    /// Returns the column named `name`.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A validated record of a model.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    schema: Arc<ModelSchema>,
    values: Vec<(String, Value)>,
}

impl ModelInstance {
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Returns the value of `attribute` (or of the key via `pk`).
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        let attribute = self.schema.resolve(attribute);
        self.values
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, v)| v)
    }

    /// Validates and assigns `value` to `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] when the attribute is unknown or the
    /// value is invalid; the instance is left unchanged.
    pub fn set(&mut self, attribute: &str, value: impl Into<Value>) -> ModelResult<()> {
        let attribute = self.schema.resolve(attribute).to_string();
        let validator = self.schema.validation.field(&attribute).ok_or_else(|| {
            ValidationError::with_field_errors(HashMap::from([(
                attribute.clone(),
                vec![ValidationError::new(
                    "Extra inputs are not permitted.",
                    "extra_forbidden",
                )],
            )]))
        })?;
        let value = validator.validate(&value.into()).map_err(|err| {
            ValidationError::with_field_errors(HashMap::from([(attribute.clone(), vec![err])]))
        })?;
        if let Some(slot) = self.values.iter_mut().find(|(a, _)| *a == attribute) {
            slot.1 = value;
        }
        Ok(())
    }

    /// Returns the primary-key value.
    pub fn pk(&self) -> &Value {
        self.get(PK_ALIAS).unwrap_or(&Value::Null)
    }

    /// Assigns the primary-key value.
    pub fn set_pk(&mut self, value: impl Into<Value>) -> ModelResult<()> {
        self.set(PK_ALIAS, value)
    }

    /// Returns every `(attribute, value)` pair in declaration order.
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    /// Renders the instance as a JSON object.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        let mut object = serde_json::Map::new();
        for (attribute, value) in &self.values {
            let json = match value {
                Value::Null => serde_json::Value::Null,
                Value::Json(j) => j.clone(),
                other => serde_json::to_value(other)
                    .map_err(|e| ModelError::Serialization(e.to_string()))?
                    .get("value")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null),
            };
            object.insert(attribute.clone(), json);
        }
        Ok(serde_json::Value::Object(object))
    }
}

/// One field of a [`ModelDeclaration`].
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDeclaration {
    pub attribute: String,
    pub kind: FieldKind,
    #[serde(flatten)]
    pub options: FieldOptions,
}

/// A model declared in a TOML or JSON document.
///
/// ```toml
/// name = "Product"
///
/// [[fields]]
/// attribute = "id"
/// kind = "Integer"
/// primary_key = true
///
/// [[fields]]
/// attribute = "price"
/// kind = "Decimal"
/// max_digits = 10
/// decimal_places = 2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDeclaration {
    pub name: String,
    #[serde(default)]
    pub tablename: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

impl ModelDeclaration {
    /// Parses a TOML declaration.
    pub fn from_toml_str(s: &str) -> ModelResult<Self> {
        toml::from_str(s).map_err(|e| ModelError::Serialization(format!("Failed to parse TOML: {e}")))
    }

    /// Parses a JSON declaration.
    pub fn from_json_str(s: &str) -> ModelResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ModelError::Serialization(format!("Failed to parse JSON: {e}")))
    }

    /// Loads a declaration file; `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelError::Configuration(format!(
                "Failed to read declaration file '{}': {e}",
                path.display()
            ))
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Turns the declaration into a builder.
    pub fn into_builder(self) -> ModelBuilder {
        let mut builder = ModelBuilder::new(self.name);
        if let Some(tablename) = self.tablename {
            builder = builder.tablename(tablename);
        }
        for field in self.fields {
            builder = builder.field(field.attribute, field.kind, field.options);
        }
        builder
    }

    /// Builds the declared model with the default factory.
    pub fn build(self) -> ModelResult<Arc<ModelSchema>> {
        self.into_builder().build()
    }
}
