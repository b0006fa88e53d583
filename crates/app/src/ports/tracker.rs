//! Tracker port: read-only access to the remote delivery tracker.
//!
//! Implementations return domain types. Transport failures (timeouts,
//! non-2xx responses, undecodable bodies) surface as
//! [`HemglassError::Network`]. The live route and forecast endpoints wrap
//! their payload in a status envelope; a non-success status there means "no
//! active data today" and is reported as `Ok(None)`, not as an error.

use std::future::Future;
use std::sync::Arc;

use hemglass_domain::delivery::{LiveRouteInfo, RouteForecast, SalesInfo, Stop};
use hemglass_domain::error::HemglassError;
use hemglass_domain::geo::BoundingBox;
use hemglass_domain::id::{RouteId, StopId};

/// The delivery tracker's HTTP API, as seen by the use-cases.
pub trait TrackerApi: Send + Sync {
    /// Stops inside `bbox`, nearest first, at most `limit` of them.
    fn nearest_stops(
        &self,
        bbox: BoundingBox,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Stop>, HemglassError>> + Send;

    /// Sales and depot contact details for a stop, as stored remotely.
    fn sales_info(
        &self,
        stop_id: &StopId,
    ) -> impl Future<Output = Result<SalesInfo, HemglassError>> + Send;

    /// Bare `HH:MM` ETA of `route_id` at `stop_id` in the source time zone,
    /// or an empty string when there is no estimate.
    fn stop_eta(
        &self,
        stop_id: &StopId,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<String, HemglassError>> + Send;

    /// Live progress of a route, `None` when it is not running.
    fn live_route_info(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<LiveRouteInfo>, HemglassError>> + Send;

    /// Planned path of a route, `None` when the tracker has none.
    fn route_forecast(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<RouteForecast>, HemglassError>> + Send;
}

impl<T: TrackerApi> TrackerApi for Arc<T> {
    fn nearest_stops(
        &self,
        bbox: BoundingBox,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Stop>, HemglassError>> + Send {
        (**self).nearest_stops(bbox, limit)
    }

    fn sales_info(
        &self,
        stop_id: &StopId,
    ) -> impl Future<Output = Result<SalesInfo, HemglassError>> + Send {
        (**self).sales_info(stop_id)
    }

    fn stop_eta(
        &self,
        stop_id: &StopId,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<String, HemglassError>> + Send {
        (**self).stop_eta(stop_id, route_id)
    }

    fn live_route_info(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<LiveRouteInfo>, HemglassError>> + Send {
        (**self).live_route_info(route_id)
    }

    fn route_forecast(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<RouteForecast>, HemglassError>> + Send {
        (**self).route_forecast(route_id)
    }
}
