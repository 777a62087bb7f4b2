//! Nullability and key resolution.
//!
//! Pure functions the factory composes to decide a field's semantic and
//! storage nullability:
//!
//! ```text
//! nullable     = resolve_nullable(..) || resolve_autoincrement_optional(..)
//! sql_nullable = resolve_sql_nullable(primary_key, sql_nullable, nullable)
//! ```

use super::options::DefaultValue;

/// Resolves semantic nullability from the declared flag and defaults.
///
/// An explicit flag wins. Otherwise the field is nullable iff it has a
/// `default` or a `server_default`. A `Null` default counts as absent.
pub fn resolve_nullable(
    explicit: Option<bool>,
    default: Option<&DefaultValue>,
    server_default: Option<&DefaultValue>,
) -> bool {
    explicit.unwrap_or_else(|| {
        default.is_some_and(DefaultValue::is_present)
            || server_default.is_some_and(DefaultValue::is_present)
    })
}

/// An autoincrement primary key need not be supplied by the caller.
pub const fn resolve_autoincrement_optional(primary_key: bool, autoincrement: bool) -> bool {
    primary_key && autoincrement
}

/// Resolves storage nullability.
///
/// A primary key is never storage-nullable, whatever was declared.
pub const fn resolve_sql_nullable(primary_key: bool, explicit: Option<bool>, nullable: bool) -> bool {
    if primary_key {
        return false;
    }
    match explicit {
        Some(flag) => flag,
        None => nullable,
    }
}
