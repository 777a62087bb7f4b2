//! Logging integration for modelforge.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-declaration spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info", "warn",
/// "error"). In debug mode a pretty, human-readable format is used; otherwise
/// a structured JSON format is used. Calling this twice is harmless: the
/// second installation attempt is ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span covering the declaration of one model.
///
/// Every descriptor constructed while the span is entered is logged with the
/// model name attached.
///
/// # Examples
///
/// ```
/// use modelforge_core::logging::declaration_span;
///
/// let span = declaration_span("example");
/// let _guard = span.enter();
/// tracing::debug!("declaring fields");
/// ```
pub fn declaration_span(model: &str) -> tracing::Span {
    tracing::info_span!("declare_model", model = model)
}
