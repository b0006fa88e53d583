//! Truck sensor: live position of the truck serving the home's route.
//!
//! The route id comes from the delivery sensor, which discovers it through
//! the nearest-stop search. The truck sensor only reads it.

use tokio::sync::{RwLock, watch};

use hemglass_domain::config_entry::ConfigEntry;
use hemglass_domain::delivery::{OffTrack, TruckStatus};
use hemglass_domain::entity::{AttributeValue, Attributes, Entity, EntityState};
use hemglass_domain::error::HemglassError;
use hemglass_domain::id::{EntityId, RouteId};
use hemglass_domain::time::TimeZones;

use super::{ExtraAttributes, PollState, PollingSensor, Polled, SensorIdentity, SensorSettings, Throttle};
use crate::ports::TrackerApi;
use crate::services::live_route::LiveRouteResolver;

/// Attribute map describing a truck status; all empty when inactive.
#[must_use]
pub fn truck_attributes(status: &TruckStatus) -> Attributes {
    let (latitude, longitude, updated, off_track) = match status {
        TruckStatus::Active(position) => (
            AttributeValue::from(position.latitude.as_str()),
            AttributeValue::from(position.longitude.as_str()),
            AttributeValue::from(position.updated.as_str()),
            off_track_value(position.off_track),
        ),
        TruckStatus::Inactive => (
            AttributeValue::empty(),
            AttributeValue::empty(),
            AttributeValue::empty(),
            AttributeValue::empty(),
        ),
    };
    Attributes::from([
        ("truckLatitude".to_string(), latitude),
        ("truckLongitude".to_string(), longitude),
        ("truckLocationUpdated".to_string(), updated),
        ("truckIsOffTrack".to_string(), off_track),
    ])
}

fn off_track_value(off_track: OffTrack) -> AttributeValue {
    match off_track {
        OffTrack::Reported(flag) => AttributeValue::Bool(flag),
        OffTrack::Unreported => AttributeValue::empty(),
    }
}

/// Polls the live position of one route.
pub struct TruckSensor<T> {
    identity: SensorIdentity,
    resolver: LiveRouteResolver<T>,
    zones: TimeZones,
    throttle: Throttle,
    route: watch::Receiver<Option<RouteId>>,
    state: RwLock<PollState<TruckStatus>>,
    extra: Option<Box<dyn ExtraAttributes>>,
}

impl<T: TrackerApi> TruckSensor<T> {
    /// Create a sensor that follows whatever route `route` currently holds.
    pub fn new(
        entry: &ConfigEntry,
        tracker: T,
        settings: SensorSettings,
        route: watch::Receiver<Option<RouteId>>,
    ) -> Self {
        Self {
            identity: SensorIdentity::new(entry, Some("truck"), "mdi:truck"),
            resolver: LiveRouteResolver::new(tracker, settings.zones),
            zones: settings.zones,
            throttle: Throttle::new(settings.min_interval),
            route,
            state: RwLock::new(PollState::Uninitialized),
            extra: None,
        }
    }

    /// Create a sensor bound to a single, already known route.
    pub fn for_route(entry: &ConfigEntry, tracker: T, settings: SensorSettings, route_id: RouteId) -> Self {
        let (_sender, route) = watch::channel(Some(route_id));
        Self::new(entry, tracker, settings, route)
    }

    #[must_use]
    pub fn with_extra_attributes(mut self, extra: Box<dyn ExtraAttributes>) -> Self {
        self.extra = Some(extra);
        self
    }

    /// The route the next poll will query.
    #[must_use]
    pub fn route_id(&self) -> Option<RouteId> {
        self.route.borrow().clone()
    }

    /// Published state, for inspection.
    pub async fn state(&self) -> PollState<TruckStatus> {
        self.state.read().await.clone()
    }

    async fn poll(&self, force: bool) -> Result<Polled, HemglassError> {
        let Some(route_id) = self.route_id() else {
            tracing::debug!(entity_id = %self.identity.entity_id, "no route known yet");
            return Ok(Polled::Suppressed);
        };
        let permit = if force {
            self.throttle.try_begin_forced()
        } else {
            self.throttle.try_begin()
        };
        let Some(_permit) = permit else {
            tracing::trace!(entity_id = %self.identity.entity_id, "truck tick suppressed");
            return Ok(Polled::Suppressed);
        };

        let status = self
            .resolver
            .resolve_truck_position(&route_id, self.zones.today())
            .await?;

        *self.state.write().await = PollState::Populated(status);
        Ok(Polled::Refreshed)
    }

    async fn snapshot(&self) -> Result<Entity, HemglassError> {
        let (state, attributes) = match &*self.state.read().await {
            PollState::Uninitialized => (EntityState::Unknown, Attributes::new()),
            PollState::Populated(status) => {
                (EntityState::from(status.is_active()), truck_attributes(status))
            }
        };
        self.identity
            .render(state, attributes, self.extra.as_deref())
    }
}

impl<T: TrackerApi> PollingSensor for TruckSensor<T> {
    fn id(&self) -> EntityId {
        self.identity.id
    }

    async fn update(&self, force: bool) -> Result<Polled, HemglassError> {
        self.poll(force).await
    }

    async fn entity(&self) -> Result<Entity, HemglassError> {
        self.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Endpoint, FakeTracker};
    use hemglass_domain::geo::HomeLocation;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry() -> ConfigEntry {
        ConfigEntry::new(HomeLocation::parse("Home", "59.33", "18.06").unwrap())
    }

    fn settings() -> SensorSettings {
        SensorSettings {
            min_interval: Duration::ZERO,
            ..SensorSettings::default()
        }
    }

    fn sensor(tracker: &Arc<FakeTracker>) -> TruckSensor<Arc<FakeTracker>> {
        TruckSensor::for_route(&entry(), Arc::clone(tracker), settings(), RouteId::new("7"))
    }

    #[tokio::test]
    async fn should_expose_unknown_state_before_first_poll() {
        let tracker = Arc::new(FakeTracker::scenario());
        let entity = sensor(&tracker).entity().await.unwrap();

        assert_eq!(entity.state, EntityState::Unknown);
        assert!(entity.attributes.is_empty());
        assert_eq!(entity.entity_id, "sensor.hemglass_home_truck");
        assert_eq!(entity.icon.as_deref(), Some("mdi:truck"));
    }

    #[tokio::test]
    async fn should_publish_position_when_route_is_live() {
        let tracker = Arc::new(FakeTracker::scenario());
        let sensor = sensor(&tracker);

        assert_eq!(sensor.update(false).await.unwrap(), Polled::Refreshed);
        let entity = sensor.entity().await.unwrap();

        assert_eq!(entity.state, EntityState::On);
        assert_eq!(entity.get_attribute("truckLatitude"), Some(&AttributeValue::from("59.3")));
        assert_eq!(entity.get_attribute("truckLongitude"), Some(&AttributeValue::from("18.2")));
        assert_eq!(entity.get_attribute("truckIsOffTrack"), Some(&AttributeValue::empty()));
    }

    #[tokio::test]
    async fn should_turn_off_and_blank_attributes_when_route_is_inactive() {
        let tracker = Arc::new(FakeTracker::scenario());
        *tracker.live.lock().unwrap() = None;
        let sensor = sensor(&tracker);

        sensor.update(false).await.unwrap();
        let entity = sensor.entity().await.unwrap();

        assert_eq!(entity.state, EntityState::Off);
        assert_eq!(entity.attributes.len(), 4);
        assert!(entity.attributes.values().all(|v| *v == AttributeValue::empty()));
    }

    #[tokio::test]
    async fn should_keep_last_good_state_when_forecast_fails() {
        let tracker = Arc::new(FakeTracker::scenario());
        let sensor = sensor(&tracker);
        sensor.update(false).await.unwrap();

        tracker.fail(Endpoint::Forecast);
        let result = sensor.update(false).await;

        assert!(matches!(result, Err(HemglassError::Network(_))));
        let entity = sensor.entity().await.unwrap();
        assert_eq!(entity.state, EntityState::On);
        assert_eq!(entity.get_attribute("truckLatitude"), Some(&AttributeValue::from("59.3")));
    }

    #[tokio::test]
    async fn should_suppress_tick_until_route_is_known() {
        let tracker = Arc::new(FakeTracker::scenario());
        let (sender, route) = watch::channel(None);
        let sensor = TruckSensor::new(&entry(), Arc::clone(&tracker), settings(), route);

        assert_eq!(sensor.update(false).await.unwrap(), Polled::Suppressed);
        assert_eq!(tracker.call_count(Endpoint::LiveRoute), 0);

        sender.send_replace(Some(RouteId::new("9")));
        assert_eq!(sensor.update(false).await.unwrap(), Polled::Refreshed);
        assert_eq!(tracker.live_routes.lock().unwrap().clone(), vec![RouteId::new("9")]);
    }

    #[tokio::test]
    async fn should_suppress_overlapping_tick() {
        let tracker = Arc::new(FakeTracker::scenario());
        let gate = Arc::new(tokio::sync::Notify::new());
        *tracker.live_gate.lock().unwrap() = Some(Arc::clone(&gate));
        let sensor = Arc::new(sensor(&tracker));

        let running = tokio::spawn({
            let sensor = Arc::clone(&sensor);
            async move { sensor.update(false).await }
        });
        while !sensor.throttle.is_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(sensor.update(true).await.unwrap(), Polled::Suppressed);

        gate.notify_one();
        assert_eq!(running.await.unwrap().unwrap(), Polled::Refreshed);
        assert_eq!(tracker.call_count(Endpoint::LiveRoute), 1);
    }
}
