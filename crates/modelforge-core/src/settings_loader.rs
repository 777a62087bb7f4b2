//! Settings loading from configuration files.
//!
//! Settings are resolved in three layers, each overriding the previous one:
//!
//! 1. [`Settings::default`],
//! 2. a TOML or JSON document, deep-merged over the defaults so a partial
//!    `[fields]` table keeps the remaining field defaults,
//! 3. `MODELFORGE_*` environment variables.
//!
//! | Env Var | Setting |
//! |---|---|
//! | `MODELFORGE_DEBUG` | `debug` |
//! | `MODELFORGE_LOG_LEVEL` | `log_level` |
//! | `MODELFORGE_UUID_FORMAT` | `fields.uuid_format` (`hex` or `string`) |
//! | `MODELFORGE_TIMEZONE` | `fields.timezone` |
//!
//! ```rust,no_run
//! use modelforge_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/modelforge.toml").unwrap();
//! assert!(!settings.log_level.is_empty());
//! ```

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{ModelError, ModelResult};
use crate::settings::{Settings, UuidFormat};

/// The document formats settings can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    fn parse(self, source: &str) -> ModelResult<Json> {
        match self {
            Self::Toml => toml::from_str::<toml::Value>(source)
                .map(toml_to_json)
                .map_err(|e| ModelError::Configuration(format!("Failed to parse TOML: {e}"))),
            Self::Json => serde_json::from_str(source)
                .map_err(|e| ModelError::Configuration(format!("Failed to parse JSON: {e}"))),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => write!(f, "TOML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Parses settings from a document in the given format.
///
/// Keys the document leaves out keep their default values.
///
/// # Errors
///
/// Returns [`ModelError::Configuration`] if the document is malformed or
/// holds values of the wrong type.
pub fn from_str(source: &str, format: ConfigFormat) -> ModelResult<Settings> {
    let defaults = serde_json::to_value(Settings::default()).map_err(|e| {
        ModelError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;
    let merged = merge_json(defaults, format.parse(source)?);
    serde_json::from_value(merged).map_err(|e| {
        ModelError::Configuration(format!("Invalid settings in {format} document: {e}"))
    })
}

/// Loads settings from a file, choosing the format from its extension.
///
/// # Errors
///
/// Returns [`ModelError::Configuration`] if the file cannot be read or parsed.
pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Settings> {
    let path = path.as_ref();
    load(path, ConfigFormat::from_path(path))
}

/// Loads settings from a TOML string.
///
/// # Errors
///
/// See [`from_str`].
pub fn from_toml_str(source: &str) -> ModelResult<Settings> {
    from_str(source, ConfigFormat::Toml)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// See [`from_str`].
pub fn from_json_str(source: &str) -> ModelResult<Settings> {
    from_str(source, ConfigFormat::Json)
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// See [`from_file`].
pub fn from_toml_file(path: impl AsRef<Path>) -> ModelResult<Settings> {
    load(path.as_ref(), ConfigFormat::Toml)
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// See [`from_file`].
pub fn from_json_file(path: impl AsRef<Path>) -> ModelResult<Settings> {
    load(path.as_ref(), ConfigFormat::Json)
}

/// Loads a TOML file, then applies environment overrides.
///
/// # Errors
///
/// See [`from_file`].
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> ModelResult<Settings> {
    from_toml_file(path).map(with_env)
}

/// Loads a JSON file, then applies environment overrides.
///
/// # Errors
///
/// See [`from_file`].
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> ModelResult<Settings> {
    from_json_file(path).map(with_env)
}

/// Defaults with environment overrides applied.
pub fn from_env() -> Settings {
    with_env(Settings::default())
}

/// Applies `MODELFORGE_*` environment variables to `settings`.
///
/// A variable whose value cannot be parsed leaves the setting unchanged.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |key| std::env::var(key).ok());
}

/// Applies overrides read through `lookup` instead of the process
/// environment.
pub fn apply_overrides_from<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(flag) = lookup("MODELFORGE_DEBUG") {
        settings.debug = is_truthy(&flag);
    }
    if let Some(level) = lookup("MODELFORGE_LOG_LEVEL") {
        settings.log_level = level;
    }
    if let Some(raw) = lookup("MODELFORGE_UUID_FORMAT") {
        match raw.parse::<UuidFormat>() {
            Ok(format) => settings.fields.uuid_format = format,
            Err(e) => tracing::debug!(error = %e, "Ignoring MODELFORGE_UUID_FORMAT"),
        }
    }
    if let Some(flag) = lookup("MODELFORGE_TIMEZONE") {
        settings.fields.timezone = is_truthy(&flag);
    }
}

fn with_env(mut settings: Settings) -> Settings {
    apply_env_overrides(&mut settings);
    settings
}

fn load(path: &Path, format: ConfigFormat) -> ModelResult<Settings> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        ModelError::Configuration(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })?;
    from_str(&source, format)
}

fn is_truthy(flag: &str) -> bool {
    ["true", "1", "yes", "on"]
        .iter()
        .any(|t| flag.trim().eq_ignore_ascii_case(t))
}

fn toml_to_json(value: toml::Value) -> Json {
    match value {
        toml::Value::String(s) => Json::String(s),
        toml::Value::Integer(i) => Json::from(i),
        toml::Value::Float(f) => Json::from(f),
        toml::Value::Boolean(b) => Json::Bool(b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(items) => items.into_iter().map(toml_to_json).collect(),
        toml::Value::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(key, v)| (key, toml_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// Merges `overlay` into `base`; objects merge key by key, anything else is
/// replaced.
fn merge_json(base: Json, overlay: Json) -> Json {
    match (base, overlay) {
        (Json::Object(mut merged), Json::Object(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Json::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_toml_keeps_unset_defaults() {
        let settings = from_toml_str("log_level = \"modelforge_db=debug\"").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "modelforge_db=debug");
        assert_eq!(settings.fields.uuid_format, UuidFormat::Hex);
    }

    #[test]
    fn test_partial_fields_table() {
        let settings = from_toml_str("[fields]\ntimezone = true").unwrap();
        assert!(settings.fields.timezone);
        assert_eq!(settings.fields.uuid_format, UuidFormat::Hex);

        let settings = from_json_str(r#"{"fields": {"uuid_format": "string"}}"#).unwrap();
        assert_eq!(settings.fields.uuid_format, UuidFormat::String);
        assert!(!settings.fields.timezone);
    }

    #[test]
    fn test_extra_table() {
        let settings = from_toml_str("[extra]\napp = \"inventory\"\nreplicas = [1, 2]").unwrap();
        assert_eq!(settings.extra["app"], "inventory");
        assert_eq!(settings.extra["replicas"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_empty_documents_are_defaults() {
        for settings in [from_toml_str("").unwrap(), from_json_str("{}").unwrap()] {
            assert!(settings.debug);
            assert_eq!(settings.log_level, "info");
        }
    }

    #[test]
    fn test_malformed_documents() {
        for result in [
            from_toml_str("[[fields"),
            from_json_str("{fields"),
            from_toml_str("[fields]\nuuid_format = \"binary\""),
            from_json_str(r#"{"debug": "maybe"}"#),
        ] {
            assert!(matches!(result, Err(ModelError::Configuration(_))));
        }
    }

    #[test]
    fn test_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("modelforge.toml");
        let json_path = dir.path().join("modelforge.JSON");
        std::fs::write(&toml_path, "debug = false\n[fields]\ntimezone = true\n").unwrap();
        std::fs::write(&json_path, r#"{"log_level": "warn"}"#).unwrap();

        let settings = from_file(&toml_path).unwrap();
        assert!(!settings.debug);
        assert!(settings.fields.timezone);
        assert_eq!(from_file(&json_path).unwrap().log_level, "warn");
        assert_eq!(from_json_file(&json_path).unwrap().log_level, "warn");
        assert!(from_toml_file(&json_path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        apply_overrides_from(
            &mut settings,
            vars(&[
                ("MODELFORGE_DEBUG", "off"),
                ("MODELFORGE_LOG_LEVEL", "trace"),
                ("MODELFORGE_UUID_FORMAT", "string"),
                ("MODELFORGE_TIMEZONE", "YES"),
            ]),
        );
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "trace");
        assert_eq!(settings.fields.uuid_format, UuidFormat::String);
        assert!(settings.fields.timezone);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, vars(&[("MODELFORGE_UUID_FORMAT", "binary")]));
        assert_eq!(settings.fields.uuid_format, UuidFormat::Hex);

        apply_overrides_from(&mut settings, vars(&[]));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_merge_replaces_non_objects() {
        let merged = merge_json(
            serde_json::json!({"outer": {"a": 1, "b": 2}, "list": [1, 2, 3]}),
            serde_json::json!({"outer": {"b": 3}, "list": [4]}),
        );
        assert_eq!(merged["outer"], serde_json::json!({"a": 1, "b": 3}));
        assert_eq!(merged["list"], serde_json::json!([4]));
    }

    #[test]
    fn test_toml_datetime_becomes_text() {
        let value: toml::Value = toml::from_str("at = 1979-05-27T07:32:00Z").unwrap();
        assert_eq!(toml_to_json(value)["at"], "1979-05-27T07:32:00Z");
    }
}
