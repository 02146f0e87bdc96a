//! Logging integration for webconfig.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-connection spans.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::error::{WebConfigError, WebConfigResult};
use crate::settings::Settings;

/// Installs the global tracing subscriber described by `settings`.
///
/// `settings.log_level` is an `EnvFilter` directive list (e.g. "debug",
/// "info,webconfig_http=trace"). Debug mode logs in a pretty, multi-line
/// format with source locations; otherwise every event is one JSON line.
///
/// # Errors
///
/// Returns [`WebConfigError::ConfigurationError`] if the log level does not
/// parse, or if a global subscriber is already installed.
pub fn setup_logging(settings: &Settings) -> WebConfigResult<()> {
    let filter = EnvFilter::try_new(&settings.log_level).map_err(|e| {
        WebConfigError::ConfigurationError(format!(
            "invalid log level '{}': {e}",
            settings.log_level
        ))
    })?;

    let installed = if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .json()
            .try_init()
    };
    installed.map_err(|e| {
        WebConfigError::ConfigurationError(format!("logging already initialized: {e}"))
    })
}

/// Creates a tracing span for one accepted connection.
///
/// Enter this span while the connection is read, dispatched and answered so
/// every log line carries the peer address.
///
/// # Examples
///
/// ```
/// use webconfig_core::logging::connection_span;
///
/// let span = connection_span("127.0.0.1:51234");
/// let _guard = span.enter();
/// tracing::info!("handling request");
/// ```
pub fn connection_span(peer: &str) -> tracing::Span {
    tracing::info_span!("connection", peer = peer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let settings = Settings {
            log_level: "webconfig=loud".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            setup_logging(&settings),
            Err(WebConfigError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_second_install_is_reported() {
        let settings = Settings {
            log_level: "warn".to_string(),
            ..Settings::default()
        };
        // The first call may already lose to another test in this process.
        let _ = setup_logging(&settings);
        assert!(matches!(
            setup_logging(&settings),
            Err(WebConfigError::ConfigurationError(_))
        ));
    }
}
