//! Tracker client configuration.

use serde::Deserialize;

/// Production tracker API.
pub const DEFAULT_BASE_URL: &str = "https://iceman-prod.azurewebsites.net/api/tracker/";

/// Connection settings for the tracker REST API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Root of the tracker API; endpoint paths are appended to it.
    pub base_url: String,
    /// Upper bound for a single request, connection included, in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound for establishing the TCP/TLS connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}
