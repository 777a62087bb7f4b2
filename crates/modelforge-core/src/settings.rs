//! Settings for modelforge.
//!
//! This module provides the [`Settings`] struct, which holds process-wide
//! configuration, and [`LazySettings`], a globally-accessible,
//! lazily-initialized settings instance. Settings only ever supply defaults
//! for options a field declaration leaves out; an explicit option always wins.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// How UUID values are laid out in their storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UuidFormat {
    /// 32 hexadecimal characters, no dashes.
    #[default]
    Hex,
    /// The canonical 36 character hyphenated form.
    String,
}

impl UuidFormat {
    /// Returns the number of characters the stored representation takes.
    pub const fn char_length(self) -> u32 {
        match self {
            Self::Hex => 32,
            Self::String => 36,
        }
    }
}

impl fmt::Display for UuidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex => write!(f, "hex"),
            Self::String => write!(f, "string"),
        }
    }
}

impl FromStr for UuidFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "string" => Ok(Self::String),
            other => Err(format!("unknown uuid format '{other}'")),
        }
    }
}

/// Defaults applied by the field factory when a declaration omits an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    /// Storage layout for UUID fields.
    pub uuid_format: UuidFormat,
    /// Whether DateTime and Time columns are timezone-aware.
    pub timezone: bool,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            uuid_format: UuidFormat::Hex,
            timezone: false,
        }
    }
}

/// Process-wide modelforge configuration.
///
/// # Examples
///
/// ```
/// use modelforge_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The tracing filter directive (e.g. "info", "modelforge_db=debug").
    pub log_level: String,
    /// Declaration defaults for field descriptors.
    #[serde(default)]
    pub fields: FieldDefaults,
    /// Arbitrary application-specific settings.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            fields: FieldDefaults::default(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, or `None` before `configure`.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup. The field
/// factory falls back to built-in defaults while it is unconfigured.
pub static SETTINGS: LazySettings = LazySettings::new();
