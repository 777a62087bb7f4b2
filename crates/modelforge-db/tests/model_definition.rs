//! Model definition integration tests.
//!
//! These tests declare a model covering every scalar field kind and exercise
//! the resulting table schema and validation schema end to end:
//! - Instance creation with defaults, required attributes, and the `pk` alias
//! - Attribute assignment and rejection of unknown attributes
//! - Declaration failures (missing or repeated primary keys, bad options)
//! - Declarations loaded from TOML and JSON files

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveTime};
use modelforge_core::ModelError;
use modelforge_db::fields::{ColumnType, FieldKind, FieldOptions};
use modelforge_db::model::{ModelBuilder, ModelDeclaration, ModelInstance, ModelSchema};
use modelforge_db::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// TEST MODEL DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════

fn midnight() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).unwrap()
}

fn example_model() -> Arc<ModelSchema> {
    ModelBuilder::new("ExampleModel")
        .tablename("example")
        .field("test", FieldKind::Integer, FieldOptions::new().primary_key(true))
        .field("test_string", FieldKind::String, FieldOptions::new().max_length(250))
        .field("test_text", FieldKind::Text, FieldOptions::new().default(""))
        .field("test_bool", FieldKind::Boolean, FieldOptions::new().nullable(false))
        .field("test_float", FieldKind::Float, FieldOptions::new().nullable(true))
        .field(
            "test_datetime",
            FieldKind::DateTime,
            FieldOptions::new().default_with(|| chrono::Utc::now().naive_utc().into()),
        )
        .field(
            "test_date",
            FieldKind::Date,
            FieldOptions::new().default_with(|| chrono::Utc::now().date_naive().into()),
        )
        .field(
            "test_time",
            FieldKind::Time,
            FieldOptions::new().default(midnight()),
        )
        .field(
            "test_json",
            FieldKind::Json,
            FieldOptions::new().default(serde_json::json!({})),
        )
        .field("test_bigint", FieldKind::BigInteger, FieldOptions::new().default(0))
        .field(
            "test_decimal",
            FieldKind::Decimal,
            FieldOptions::new().scale(10).precision(2),
        )
        .field(
            "test_decimal2",
            FieldKind::Decimal,
            FieldOptions::new().max_digits(10).decimal_places(2),
        )
        .build()
        .unwrap()
}

fn example() -> ModelInstance {
    let input = HashMap::from([
        ("pk".to_string(), Value::Int(1)),
        ("test_string".to_string(), Value::from("test")),
        ("test_bool".to_string(), Value::Bool(true)),
        ("test_decimal".to_string(), Value::Float(3.5)),
        ("test_decimal2".to_string(), Value::Float(5.5)),
    ]);
    example_model().instantiate(input).unwrap()
}

fn validation_codes(err: &ModelError, attribute: &str) -> Vec<String> {
    match err {
        ModelError::Validation(e) => e
            .errors_for(attribute)
            .iter()
            .map(|e| e.code.clone())
            .collect(),
        other => panic!("expected a validation error, got {other}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INSTANCES
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_not_nullable_field_is_required() {
    let input = HashMap::from([
        ("test".to_string(), Value::Int(1)),
        ("test_string".to_string(), Value::from("test")),
    ]);
    let err = example_model().instantiate(input).unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(validation_codes(&err, "test_bool"), vec!["required"]);
    assert_eq!(validation_codes(&err, "test_decimal"), vec!["required"]);
    assert!(validation_codes(&err, "test_text").is_empty());
}

#[test]
fn test_model_attribute_access() {
    let mut example = example();
    assert_eq!(example.get("test"), Some(&Value::Int(1)));
    assert_eq!(example.get("test_string"), Some(&Value::from("test")));
    match example.get("test_datetime") {
        Some(Value::DateTime(dt)) => assert_eq!(dt.year(), chrono::Utc::now().year()),
        other => panic!("unexpected datetime value {other:?}"),
    }
    assert_eq!(
        example.get("test_date"),
        Some(&Value::Date(chrono::Utc::now().date_naive()))
    );
    assert_eq!(example.get("test_time"), Some(&Value::Time(midnight())));
    assert_eq!(example.get("test_text"), Some(&Value::from("")));
    assert_eq!(example.get("test_float"), Some(&Value::Null));
    assert_eq!(example.get("test_bigint"), Some(&Value::Int(0)));
    assert_eq!(example.get("test_json"), Some(&Value::Json(serde_json::json!({}))));
    assert_eq!(example.get("test_decimal"), Some(&Value::from("3.5")));
    assert_eq!(example.get("test_decimal2"), Some(&Value::from("5.5")));

    example.set("test", 12).unwrap();
    assert_eq!(example.get("test"), Some(&Value::Int(12)));
}

#[test]
fn test_model_attribute_json_access() {
    let mut example = example();
    example
        .set("test_json", serde_json::json!({"aa": 12}))
        .unwrap();
    assert_eq!(
        example.get("test_json"),
        Some(&Value::Json(serde_json::json!({"aa": 12})))
    );
}

#[test]
fn test_json_rejects_non_serializable_value() {
    let mut example = example();
    let now = chrono::Utc::now().naive_utc();
    let err = example.set("test_json", now).unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(
        example.get("test_json"),
        Some(&Value::Json(serde_json::json!({})))
    );
}

#[test]
fn test_non_existing_attr() {
    let mut example = example();
    let err = example.set("new_attr", 12).unwrap_err();
    assert_eq!(validation_codes(&err, "new_attr"), vec!["extra_forbidden"]);
    assert!(example.get("new_attr").is_none());
}

#[test]
fn test_primary_key_access_and_setting() {
    let mut example = example();
    assert_eq!(example.pk(), &Value::Int(1));
    example.set_pk(2).unwrap();
    assert_eq!(example.pk(), &Value::Int(2));
    assert_eq!(example.get("test"), Some(&Value::Int(2)));
}

#[test]
fn test_invalid_assignment_leaves_value_unchanged() {
    let mut example = example();
    let err = example.set("test_string", "x".repeat(251)).unwrap_err();
    assert_eq!(validation_codes(&err, "test_string"), vec!["max_length"]);
    assert_eq!(example.get("test_string"), Some(&Value::from("test")));
}

#[test]
fn test_instance_to_json() {
    let json = example().to_json().unwrap();
    assert_eq!(json["test"], serde_json::json!(1));
    assert_eq!(json["test_string"], serde_json::json!("test"));
    assert_eq!(json["test_float"], serde_json::Value::Null);
    assert_eq!(json["test_json"], serde_json::json!({}));
}

// ═══════════════════════════════════════════════════════════════════════
// TABLE SCHEMA
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_table_is_created() {
    let model = example_model();
    let table = model.table();
    assert_eq!(table.name, "example");
    for name in [
        "test",
        "test_text",
        "test_string",
        "test_datetime",
        "test_date",
        "test_float",
        "test_bigint",
        "test_json",
    ] {
        assert!(table.column(name).is_some(), "missing column {name}");
        assert!(model.validation().field(name).is_some(), "missing validator {name}");
    }

    let pk = table.column("test").unwrap();
    assert!(pk.primary_key);
    assert!(pk.autoincrement);
    assert!(!pk.nullable);

    assert_eq!(
        table.column("test_string").unwrap().column_type,
        ColumnType::String { length: 250 }
    );
    assert_eq!(
        table.column("test_decimal").unwrap().column_type,
        ColumnType::Decimal {
            precision: 2,
            scale: 10
        }
    );
    assert_eq!(
        table.column("test_decimal2").unwrap().column_type,
        ColumnType::Decimal {
            precision: 10,
            scale: 2
        }
    );
    assert_eq!(
        table.column("test_json").unwrap().column_type,
        ColumnType::Json { none_as_null: true }
    );
}

// ═══════════════════════════════════════════════════════════════════════
// DECLARATION FAILURES
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_no_pk_in_model_definition() {
    let err = ModelBuilder::new("ExampleModel2")
        .field("test_string", FieldKind::String, FieldOptions::new().max_length(250))
        .build()
        .unwrap_err();
    assert!(err.is_definition_error());
}

#[test]
fn test_two_pks_in_model_definition() {
    let err = ModelBuilder::new("ExampleModel2")
        .field("id", FieldKind::Integer, FieldOptions::new().primary_key(true))
        .field(
            "test_string",
            FieldKind::String,
            FieldOptions::new().max_length(250).primary_key(true),
        )
        .build()
        .unwrap_err();
    assert!(err.is_definition_error());
}

#[test]
fn test_validation_only_pk_in_model_definition() {
    let err = ModelBuilder::new("ExampleModel2")
        .field(
            "test",
            FieldKind::Integer,
            FieldOptions::new().primary_key(true).validation_only(true),
        )
        .build()
        .unwrap_err();
    assert!(err.is_definition_error());
    assert!(err.to_string().contains("ExampleModel2.test"));
}

#[test]
fn test_validation_only_field_has_no_column() {
    let model = ModelBuilder::new("Note")
        .field("id", FieldKind::Integer, FieldOptions::new().primary_key(true))
        .field(
            "draft",
            FieldKind::String,
            FieldOptions::new().max_length(20).validation_only(true).nullable(true),
        )
        .build()
        .unwrap();
    assert!(model.field("draft").unwrap().validation_only());
    assert!(model.table().column("draft").is_none());
    assert_eq!(model.table().columns.len(), 1);
    assert!(model.validation().field("draft").is_some());

    let mut note = model
        .instantiate(HashMap::from([("id".to_string(), Value::Int(1))]))
        .unwrap();
    note.set("draft", "hello").unwrap();
    assert_eq!(note.get("draft"), Some(&Value::from("hello")));
}

#[test]
fn test_decimal_error_in_model_definition() {
    let err = ModelBuilder::new("ExampleModel2")
        .field("test", FieldKind::Decimal, FieldOptions::new().primary_key(true))
        .build()
        .unwrap_err();
    assert!(err.is_definition_error());
    assert!(err.to_string().contains("scale and precision"));
}

#[test]
fn test_string_error_in_model_definition() {
    let err = ModelBuilder::new("ExampleModel2")
        .field("test", FieldKind::String, FieldOptions::new().primary_key(true))
        .build()
        .unwrap_err();
    assert!(err.is_definition_error());
    assert!(err.to_string().contains("max_length"));
}

// ═══════════════════════════════════════════════════════════════════════
// DECLARATION FILES
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_declaration_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("product.toml");
    std::fs::write(
        &path,
        r#"
name = "Product"

[[fields]]
attribute = "id"
kind = "Integer"
primary_key = true

[[fields]]
attribute = "name"
kind = "String"
max_length = 100

[[fields]]
attribute = "price"
kind = "Decimal"
max_digits = 10
decimal_places = 2
default = 0
"#,
    )
    .unwrap();

    let model = ModelDeclaration::from_file(&path).unwrap().build().unwrap();
    assert_eq!(model.tablename(), "products");
    assert_eq!(model.pk_name(), "id");
    let price = model.field("price").unwrap();
    assert!(price.nullable());
    assert_eq!(
        price.column_type(),
        &ColumnType::Decimal {
            precision: 10,
            scale: 2
        }
    );
}

#[test]
fn test_declaration_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tag.json");
    std::fs::write(
        &path,
        r#"{
            "name": "Tag",
            "tablename": "tags",
            "fields": [
                {"attribute": "id", "kind": "UUID", "primary_key": true},
                {"attribute": "label", "kind": "String", "max_length": 0}
            ]
        }"#,
    )
    .unwrap();

    let err = ModelDeclaration::from_file(&path)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.is_definition_error());
    assert!(err.to_string().contains("Tag.label"));
}

#[test]
fn test_declaration_with_enum_and_validation_only_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shirt.toml");
    std::fs::write(
        &path,
        r#"
name = "Shirt"

[[fields]]
attribute = "id"
kind = "Integer"
primary_key = true

[[fields]]
attribute = "size"
kind = "Enum"
enum_class = { name = "Size", members = [ { name = "S", value = "s" }, { name = "M", value = "m" } ] }
default = "s"

[[fields]]
attribute = "note"
kind = "Text"
pydantic_only = true
nullable = true
"#,
    )
    .unwrap();

    let model = ModelDeclaration::from_file(&path).unwrap().build().unwrap();
    let size = model.field("size").unwrap();
    let class = size.enum_class().unwrap();
    assert_eq!(class.names(), vec!["S", "M"]);
    assert_eq!(class.members[0].value, Value::from("s"));
    assert!(model.field("note").unwrap().validation_only());
    assert!(model.table().column("note").is_none());
    assert!(model.table().column("size").is_some());
}

#[test]
fn test_missing_declaration_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModelDeclaration::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}
