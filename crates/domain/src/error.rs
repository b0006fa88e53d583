//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HemglassError`] via `#[from]` (or `into_domain` for adapter errors that
//! carry third-party sources).

/// Top-level error shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum HemglassError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The nearest-stop search returned an empty result list.
    #[error("no delivery stop found near the given coordinates")]
    NoStopFound,

    #[error("route data error")]
    Route(#[from] RouteError),

    #[error("clock conversion error")]
    Clock(#[from] ClockError),

    /// Transport, timeout or decoding failure talking to the tracker service.
    #[error("tracker service unreachable")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HemglassError {
    /// Short, stable name of the error kind, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::NoStopFound => "no_stop_found",
            Self::Route(_) => "route",
            Self::Clock(_) => "clock",
            Self::Network(_) => "network",
        }
    }
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid {field} coordinate: {value:?}")]
    InvalidCoordinates { field: &'static str, value: String },

    #[error("search radius must be a positive number of degrees, got {0}")]
    NonPositiveRadius(f64),

    #[error("name must not be empty")]
    EmptyName,

    #[error("entity_id must not be empty")]
    EmptyEntityId,

    #[error("unsupported service {0:?}")]
    UnsupportedService(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The live route and forecast returned by the tracker do not line up.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RouteError {
    #[error("route {0} reports live data but no forecast")]
    ForecastUnavailable(String),

    #[error("live route info contains no position index")]
    EmptyLiveIndex,

    #[error("live index {index} is outside the forecast of {len} points")]
    IndexOutOfBounds { index: u32, len: usize },

    #[error("malformed forecast coordinate {0:?}")]
    MalformedCoordinate(String),
}

/// A bare clock string could not be placed in time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClockError {
    #[error("unparseable clock time {0:?}")]
    Parse(String),

    #[error("clock time {0} does not exist in the source time zone on that date")]
    Nonexistent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_via_from() {
        let err: HemglassError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            HemglassError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Entity",
            id: "sensor.home".to_string(),
        };
        assert_eq!(err.to_string(), "Entity sensor.home not found");
    }

    #[test]
    fn should_display_index_out_of_bounds() {
        let err = RouteError::IndexOutOfBounds { index: 9, len: 4 };
        assert_eq!(
            err.to_string(),
            "live index 9 is outside the forecast of 4 points"
        );
    }

    #[test]
    fn should_report_kind_for_each_variant() {
        assert_eq!(HemglassError::NoStopFound.kind(), "no_stop_found");
        assert_eq!(
            HemglassError::from(RouteError::EmptyLiveIndex).kind(),
            "route"
        );
        let io = std::io::Error::other("boom");
        assert_eq!(HemglassError::Network(Box::new(io)).kind(), "network");
    }
}
