//! Settings for the embedded configuration server.
//!
//! [`Settings`] holds everything the server consumes: where to listen, which
//! folder to serve static content from, where auto-saved values live, and how
//! to log. There is no global instance; the host builds one (usually through
//! [`settings_loader`](crate::settings_loader)) and hands it to the app.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The complete set of server settings.
///
/// # Examples
///
/// ```
/// use webconfig_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.port, 8080);
/// assert_eq!(settings.index_file, "index.htm");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Listener ─────────────────────────────────────────────────────

    /// Address the listener binds to.
    pub bind_address: String,
    /// Port the listener binds to. `0` picks an ephemeral port.
    pub port: u16,
    /// Value of the `Server` response header.
    pub server_name: String,
    /// Size of each socket read.
    pub read_buffer_size: usize,
    /// Largest `Content-Length` accepted for a request body.
    pub max_body_size: usize,

    // ── Content ──────────────────────────────────────────────────────

    /// Folder that static files are served from. Requests may never
    /// resolve outside of it.
    pub root_folder: PathBuf,
    /// File served when a request names a folder that contains it.
    pub index_file: String,
    /// File (relative to `root_folder`) holding auto-saved input values.
    pub snapshot_file: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "debug", "webconfig_http=trace").
    pub log_level: String,
    /// Pretty, human-readable logs when `true`; JSON lines otherwise.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            server_name: "HTTPServer/1.0".to_string(),
            read_buffer_size: 4096,
            max_body_size: 1024 * 1024,

            root_folder: PathBuf::from("www"),
            index_file: "index.htm".to_string(),
            snapshot_file: "WebConfig.toml".to_string(),

            log_level: "info".to_string(),
            debug: true,
        }
    }
}

impl Settings {
    /// Returns the full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root_folder.join(&self.snapshot_file)
    }

    /// Returns the `address:port` string the listener binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address, "0.0.0.0");
        assert_eq!(settings.server_name, "HTTPServer/1.0");
        assert_eq!(settings.max_body_size, 1_048_576);
        assert!(settings.debug);
    }

    #[test]
    fn test_snapshot_path() {
        let settings = Settings {
            root_folder: PathBuf::from("/srv/www"),
            ..Settings::default()
        };
        assert_eq!(
            settings.snapshot_path(),
            PathBuf::from("/srv/www/WebConfig.toml")
        );
    }

    #[test]
    fn test_listen_address() {
        let settings = Settings {
            bind_address: "127.0.0.1".into(),
            port: 9000,
            ..Settings::default()
        };
        assert_eq!(settings.listen_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_serde_roundtrip_keeps_fields() {
        let settings = Settings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["port"], 8080);
        assert_eq!(json["root_folder"], "www");
    }
}
