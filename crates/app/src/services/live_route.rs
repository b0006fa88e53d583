//! Live route resolver: where the truck serving a route is right now.
//!
//! The tracker reports progress as a 1-based index into the route's forecast
//! path. Resolving a position therefore takes two calls: the live index, then
//! the forecast it points into.

use chrono::NaiveDate;

use hemglass_domain::delivery::{LiveRouteInfo, RouteForecast, TruckPosition, TruckStatus};
use hemglass_domain::error::{HemglassError, RouteError};
use hemglass_domain::id::RouteId;
use hemglass_domain::time::{ClockFormat, TimeZones};

use crate::ports::TrackerApi;

/// Derives the live truck position of a route.
#[derive(Debug, Clone)]
pub struct LiveRouteResolver<T> {
    tracker: T,
    zones: TimeZones,
}

impl<T: TrackerApi> LiveRouteResolver<T> {
    pub fn new(tracker: T, zones: TimeZones) -> Self {
        Self { tracker, zones }
    }

    /// Live progress of `route_id`, `None` when the route is not running.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Network`] when the tracker cannot be reached.
    pub async fn fetch_live_route(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<LiveRouteInfo>, HemglassError> {
        self.tracker.live_route_info(route_id).await
    }

    /// Forecast path of `route_id`, `None` when the tracker has none.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Network`] when the tracker cannot be reached.
    pub async fn fetch_forecast(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<RouteForecast>, HemglassError> {
        self.tracker.route_forecast(route_id).await
    }

    /// Resolve the truck's current position on `today`.
    ///
    /// A route without live data is [`TruckStatus::Inactive`]; that is the
    /// normal off-hours answer, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Route`] when the route is live but its
    /// forecast is missing or does not contain the reported index,
    /// [`HemglassError::Clock`] when the report time is not a clock time, and
    /// [`HemglassError::Network`] when the tracker cannot be reached.
    pub async fn resolve_truck_position(
        &self,
        route_id: &RouteId,
        today: NaiveDate,
    ) -> Result<TruckStatus, HemglassError> {
        let Some(live) = self.fetch_live_route(route_id).await? else {
            tracing::debug!(%route_id, "route not running today");
            return Ok(TruckStatus::Inactive);
        };

        let forecast = self
            .fetch_forecast(route_id)
            .await?
            .ok_or_else(|| RouteError::ForecastUnavailable(route_id.to_string()))?;

        let position = self.locate(&live, &forecast, today)?;
        tracing::debug!(
            %route_id,
            latitude = %position.latitude,
            longitude = %position.longitude,
            "truck located"
        );
        Ok(TruckStatus::Active(position))
    }

    fn locate(
        &self,
        live: &LiveRouteInfo,
        forecast: &RouteForecast,
        today: NaiveDate,
    ) -> Result<TruckPosition, HemglassError> {
        let current = live.current().ok_or(RouteError::EmptyLiveIndex)?;
        let (latitude, longitude) = forecast.point(current.index)?;
        let updated =
            self.zones
                .convert_clock(today, &current.time, ClockFormat::HourMinuteSecond)?;

        Ok(TruckPosition {
            latitude,
            longitude,
            updated,
            off_track: live.is_off_track.into(),
        })
    }
}
