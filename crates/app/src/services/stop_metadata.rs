//! Stop metadata: sales/depot details and the localized ETA of a stop.

use chrono::NaiveDate;

use hemglass_domain::delivery::SalesInfo;
use hemglass_domain::error::HemglassError;
use hemglass_domain::id::{RouteId, StopId};
use hemglass_domain::time::{ClockFormat, TimeZones};

use crate::ports::TrackerApi;

/// Fetches the per-stop details shown next to the delivery date.
#[derive(Debug, Clone)]
pub struct StopMetadata<T> {
    tracker: T,
    zones: TimeZones,
}

impl<T: TrackerApi> StopMetadata<T> {
    pub fn new(tracker: T, zones: TimeZones) -> Self {
        Self { tracker, zones }
    }

    /// Sales info in display form (capitalized depot, street and city).
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Network`] when the tracker cannot be reached.
    pub async fn fetch_sales_info(&self, stop_id: &StopId) -> Result<SalesInfo, HemglassError> {
        let info = self.tracker.sales_info(stop_id).await?;
        Ok(info.for_display())
    }

    /// The tracker's ETA for `route_id` at `stop_id`, converted to local
    /// `HH:MM` on `today`. An empty ETA stays empty.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Network`] when the tracker cannot be reached
    /// and [`HemglassError::Clock`] when the ETA is not a clock time.
    pub async fn fetch_eta(
        &self,
        stop_id: &StopId,
        route_id: &RouteId,
        today: NaiveDate,
    ) -> Result<String, HemglassError> {
        let raw = self.tracker.stop_eta(stop_id, route_id).await?;
        let eta = self
            .zones
            .convert_clock(today, &raw, ClockFormat::HourMinute)?;
        Ok(eta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Endpoint, FakeTracker};
    use std::sync::Arc;

    fn summer_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    #[tokio::test]
    async fn should_capitalize_depot_and_address() {
        let tracker = Arc::new(FakeTracker::scenario());
        let metadata = StopMetadata::new(tracker, TimeZones::default());

        let info = metadata.fetch_sales_info(&StopId::new("42")).await.unwrap();

        assert_eq!(info.depot_name, "Solna");
        assert_eq!(info.street_address, "Storgatan 1");
        assert_eq!(info.city, "Stockholm");
        assert_eq!(info.salesman_name, "Anna");
        assert_eq!(info.cancelled_message.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn should_convert_eta_to_local_time() {
        let tracker = Arc::new(FakeTracker::scenario());
        let metadata = StopMetadata::new(tracker, TimeZones::default());

        let eta = metadata
            .fetch_eta(&StopId::new("42"), &RouteId::new("7"), summer_day())
            .await
            .unwrap();

        assert_eq!(eta, "16:05");
    }

    #[tokio::test]
    async fn should_return_empty_eta_without_conversion() {
        let tracker = Arc::new(FakeTracker::scenario());
        tracker.eta.lock().unwrap().clear();
        let metadata = StopMetadata::new(tracker, TimeZones::default());

        let eta = metadata
            .fetch_eta(&StopId::new("42"), &RouteId::new("7"), summer_day())
            .await
            .unwrap();

        assert_eq!(eta, "");
    }

    #[tokio::test]
    async fn should_reject_unparseable_eta() {
        let tracker = Arc::new(FakeTracker::scenario());
        *tracker.eta.lock().unwrap() = "soon".to_string();
        let metadata = StopMetadata::new(tracker, TimeZones::default());

        let result = metadata
            .fetch_eta(&StopId::new("42"), &RouteId::new("7"), summer_day())
            .await;

        assert!(matches!(result, Err(HemglassError::Clock(_))));
    }

    #[tokio::test]
    async fn should_propagate_sales_info_network_error() {
        let tracker = Arc::new(FakeTracker::scenario());
        tracker.fail(Endpoint::SalesInfo);
        let metadata = StopMetadata::new(tracker, TimeZones::default());

        let result = metadata.fetch_sales_info(&StopId::new("42")).await;

        assert!(matches!(result, Err(HemglassError::Network(_))));
    }
}
