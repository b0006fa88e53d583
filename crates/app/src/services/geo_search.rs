//! Geo search: the delivery stop nearest to a coordinate.

use hemglass_domain::delivery::Stop;
use hemglass_domain::error::HemglassError;
use hemglass_domain::geo::{BoundingBox, Coordinate, SearchRadius};

use crate::ports::TrackerApi;

/// Finds the nearest stop inside a fixed flat-degree box.
///
/// The same [`SearchRadius`] must be used for setup validation and for
/// polling, otherwise a location accepted at setup could find nothing later.
#[derive(Debug, Clone)]
pub struct GeoSearch<T> {
    tracker: T,
    radius: SearchRadius,
}

impl<T: TrackerApi> GeoSearch<T> {
    pub fn new(tracker: T, radius: SearchRadius) -> Self {
        Self { tracker, radius }
    }

    #[must_use]
    pub fn radius(&self) -> SearchRadius {
        self.radius
    }

    /// Query the tracker once for the single nearest stop around `center`.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::NoStopFound`] when the box contains no stop,
    /// or [`HemglassError::Network`] when the tracker cannot be reached.
    pub async fn find_nearest_stop(&self, center: Coordinate) -> Result<Stop, HemglassError> {
        let bbox = BoundingBox::around(center, self.radius);
        let stop = self
            .tracker
            .nearest_stops(bbox, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(HemglassError::NoStopFound)?;

        tracing::debug!(
            stop_id = %stop.stop_id,
            route_id = %stop.route_id,
            "nearest stop resolved"
        );
        Ok(stop)
    }
}
