//! Config flow: turns user-supplied setup data into a validated entry.
//!
//! The user provides a name and two coordinates as text. A location is
//! accepted only if the tracker knows a delivery stop near it.

use std::collections::BTreeMap;

use hemglass_domain::config_entry::ConfigEntry;
use hemglass_domain::error::{HemglassError, ValidationError};
use hemglass_domain::geo::HomeLocation;

use crate::ports::TrackerApi;
use crate::services::geo_search::GeoSearch;

/// Raw form input, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

/// Why a setup attempt was refused.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("coordinates are not valid numbers")]
    InvalidCoordinates(#[source] ValidationError),

    #[error("no delivery stops found near the given coordinates")]
    NoStopsFound,

    #[error("unexpected error during setup")]
    Unknown(#[source] HemglassError),
}

impl SetupError {
    /// Error code shown on the setup form.
    #[must_use]
    pub fn form_code(&self) -> &'static str {
        match self {
            Self::InvalidCoordinates(_) => "invalid_coordinates",
            Self::NoStopsFound => "no_stops_found",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Outcome of submitting the setup form.
#[derive(Debug)]
pub enum FlowResult {
    /// Setup succeeded; the entry is ready to hand to the integration.
    CreateEntry(ConfigEntry),
    /// Setup failed; show the form again with these errors.
    ShowForm { errors: BTreeMap<String, String> },
}

/// Validates setup data against the tracker.
pub struct ConfigFlow<T> {
    search: GeoSearch<T>,
}

impl<T: TrackerApi> ConfigFlow<T> {
    /// Create a flow that validates with the same search the sensors poll with.
    pub fn new(search: GeoSearch<T>) -> Self {
        Self { search }
    }

    /// Parse and check `input`, returning the entry to create.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidCoordinates`] for non-numeric input (or a
    /// blank name), [`SetupError::NoStopsFound`] when no stop is near the
    /// location and [`SetupError::Unknown`] for anything else.
    pub async fn validate_input(&self, input: &UserInput) -> Result<ConfigEntry, SetupError> {
        let home = HomeLocation::parse(&input.name, &input.latitude, &input.longitude)
            .map_err(SetupError::InvalidCoordinates)?;

        match self.search.find_nearest_stop(home.coordinate()).await {
            Ok(_) => Ok(ConfigEntry::new(home)),
            Err(HemglassError::NoStopFound) => Err(SetupError::NoStopsFound),
            Err(err) => Err(SetupError::Unknown(err)),
        }
    }

    /// Run one submission of the setup form.
    pub async fn submit(&self, input: &UserInput) -> FlowResult {
        match self.validate_input(input).await {
            Ok(entry) => {
                tracing::info!(title = %entry.title, "setup validated");
                FlowResult::CreateEntry(entry)
            }
            Err(err) => {
                if let SetupError::Unknown(source) = &err {
                    tracing::error!(err = %source, kind = source.kind(), "unexpected setup failure");
                } else {
                    tracing::warn!(%err, "setup rejected");
                }
                let errors = BTreeMap::from([("base".to_string(), err.form_code().to_string())]);
                FlowResult::ShowForm { errors }
            }
        }
    }
}
