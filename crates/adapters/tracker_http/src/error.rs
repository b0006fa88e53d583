//! Tracker adapter error types.

use hemglass_domain::error::HemglassError;

/// Errors specific to the tracker HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Network, TLS, timeout or non-2xx status from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected JSON shape.
    #[error("unexpected response body for {context}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),
}

impl TrackerError {
    /// Convert into a [`HemglassError::Network`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> HemglassError {
        HemglassError::Network(Box::new(self))
    }
}

impl From<TrackerError> for HemglassError {
    fn from(err: TrackerError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<u32>("\"nope\"").unwrap_err()
    }

    #[test]
    fn should_display_deserialize_context() {
        let err = TrackerError::Deserialize {
            context: "stopsEta".to_string(),
            source: decode_error(),
        };
        assert_eq!(err.to_string(), "unexpected response body for stopsEta");
    }

    #[test]
    fn should_display_invalid_base_url() {
        let err = TrackerError::InvalidBaseUrl("mailto:x".to_string());
        assert_eq!(err.to_string(), "invalid base URL \"mailto:x\"");
    }

    #[test]
    fn should_convert_to_network_error() {
        let err: HemglassError = TrackerError::InvalidBaseUrl(String::new()).into();
        assert!(matches!(err, HemglassError::Network(_)));
        assert_eq!(err.kind(), "network");
    }
}
