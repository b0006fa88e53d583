//! Config entry: the validated result of setting up the integration.

use serde::{Deserialize, Serialize};

use crate::geo::HomeLocation;

/// A validated setup, handed by value to the integration that uses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Display title, taken from the home location name.
    pub title: String,
    pub home: HomeLocation,
}

impl ConfigEntry {
    #[must_use]
    pub fn new(home: HomeLocation) -> Self {
        Self {
            title: home.name.clone(),
            home,
        }
    }

    /// Stable id shared by every entity created for this entry, e.g.
    /// `hemglass_Home_59.33_18.06`.
    #[must_use]
    pub fn unique_id(&self, domain: &str) -> String {
        format!(
            "{domain}_{}_{}_{}",
            self.home.name, self.home.latitude, self.home.longitude
        )
    }
}
