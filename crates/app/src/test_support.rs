//! Scriptable in-memory [`TrackerApi`] shared by the unit tests.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use hemglass_domain::delivery::{LiveIndex, LiveRouteInfo, RouteForecast, SalesInfo, Stop};
use hemglass_domain::error::HemglassError;
use hemglass_domain::geo::BoundingBox;
use hemglass_domain::id::{RouteId, StopId};

use crate::ports::TrackerApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Endpoint {
    NearestStops,
    SalesInfo,
    StopEta,
    LiveRoute,
    Forecast,
}

#[derive(Default)]
pub(crate) struct FakeTracker {
    pub stops: Mutex<Vec<Stop>>,
    pub sales: Mutex<SalesInfo>,
    pub eta: Mutex<String>,
    pub live: Mutex<Option<LiveRouteInfo>>,
    pub forecast: Mutex<Option<RouteForecast>>,
    pub failing: Mutex<HashSet<Endpoint>>,
    pub calls: Mutex<Vec<Endpoint>>,
    pub searched: Mutex<Vec<BoundingBox>>,
    pub live_routes: Mutex<Vec<RouteId>>,
    /// When set, the live route call waits for a notification before answering.
    pub live_gate: Mutex<Option<Arc<Notify>>>,
}

pub(crate) fn stop(stop_id: &str, route_id: &str) -> Stop {
    Stop {
        stop_id: StopId::new(stop_id),
        latitude: 59.331,
        longitude: 18.061,
        next_date: "2026-10-21T00:00:00".to_string(),
        next_time: "17:10".to_string(),
        route_id: RouteId::new(route_id),
    }
}

impl FakeTracker {
    /// Stop 42 on route 7, depot "solna", truck at live index 3 of a four
    /// point forecast.
    pub fn scenario() -> Self {
        let fake = Self::default();
        *fake.stops.lock().unwrap() = vec![stop("42", "7")];
        *fake.sales.lock().unwrap() = SalesInfo {
            salesman_name: "Anna".to_string(),
            phone_number: "070-1234567".to_string(),
            depot_name: "solna".to_string(),
            depot_email: "solna@example.com".to_string(),
            street_address: "storgatan 1".to_string(),
            city: "stockholm".to_string(),
            comment: String::new(),
            cancelled: false,
            cancelled_message: None,
        };
        *fake.eta.lock().unwrap() = "14:05".to_string();
        *fake.live.lock().unwrap() = Some(LiveRouteInfo {
            indices: vec![LiveIndex {
                index: 3,
                time: "14:05:00".to_string(),
            }],
            is_off_track: None,
        });
        *fake.forecast.lock().unwrap() = Some(RouteForecast(vec![
            "59.1,18.0".to_string(),
            "59.2,18.1".to_string(),
            "59.3,18.2".to_string(),
            "59.4,18.3".to_string(),
        ]));
        fake
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|called| **called == endpoint)
            .count()
    }

    fn enter(&self, endpoint: Endpoint) -> Result<(), HemglassError> {
        self.calls.lock().unwrap().push(endpoint);
        if self.failing.lock().unwrap().contains(&endpoint) {
            let err = std::io::Error::other(format!("{endpoint:?} unavailable"));
            return Err(HemglassError::Network(Box::new(err)));
        }
        Ok(())
    }
}

impl TrackerApi for FakeTracker {
    fn nearest_stops(
        &self,
        bbox: BoundingBox,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Stop>, HemglassError>> + Send {
        self.searched.lock().unwrap().push(bbox);
        let limit = usize::try_from(limit).unwrap();
        let result = self.enter(Endpoint::NearestStops).map(|()| {
            let mut stops = self.stops.lock().unwrap().clone();
            stops.truncate(limit);
            stops
        });
        async move { result }
    }

    fn sales_info(
        &self,
        _stop_id: &StopId,
    ) -> impl Future<Output = Result<SalesInfo, HemglassError>> + Send {
        let result = self
            .enter(Endpoint::SalesInfo)
            .map(|()| self.sales.lock().unwrap().clone());
        async move { result }
    }

    fn stop_eta(
        &self,
        _stop_id: &StopId,
        _route_id: &RouteId,
    ) -> impl Future<Output = Result<String, HemglassError>> + Send {
        let result = self
            .enter(Endpoint::StopEta)
            .map(|()| self.eta.lock().unwrap().clone());
        async move { result }
    }

    fn live_route_info(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<LiveRouteInfo>, HemglassError>> + Send {
        self.live_routes.lock().unwrap().push(route_id.clone());
        let gate = self.live_gate.lock().unwrap().clone();
        let result = self
            .enter(Endpoint::LiveRoute)
            .map(|()| self.live.lock().unwrap().clone());
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            result
        }
    }

    fn route_forecast(
        &self,
        _route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<RouteForecast>, HemglassError>> + Send {
        let result = self
            .enter(Endpoint::Forecast)
            .map(|()| self.forecast.lock().unwrap().clone());
        async move { result }
    }
}
