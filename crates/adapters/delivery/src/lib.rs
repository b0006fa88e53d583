//! # hemglass-adapter-delivery
//!
//! The `hemglass` integration: one delivery sensor for the configured home
//! location and one truck sensor following the route that serves it.
//!
//! ## How it works
//!
//! `setup` looks up the nearest stop once to learn the route id, builds both
//! sensors, runs their first update and registers the resulting entities.
//! A failing first update is logged and the entity is registered in its
//! unknown state. `start_background` then spawns one poll loop per sensor.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `hemglass-app` and `hemglass-domain`.

mod config;
mod poller;

pub use config::DeliveryConfig;

use std::sync::Arc;

use tokio::task::JoinHandle;

use hemglass_app::ports::{Integration, IntegrationContext, TrackerApi};
use hemglass_app::sensors::{
    DeliverySensor, PollingSensor, SensorSettings, TruckSensor,
};
use hemglass_app::services::geo_search::GeoSearch;
use hemglass_domain::config_entry::ConfigEntry;
use hemglass_domain::entity::{Attributes, Entity};
use hemglass_domain::error::{HemglassError, NotFoundError, ValidationError};
use hemglass_domain::id::{EntityId, RouteId};

/// Service forcing an immediate poll of one entity.
pub const UPDATE_ENTITY: &str = "update_entity";

/// Delivery tracker integration for a single home location.
pub struct DeliveryIntegration<T> {
    entry: ConfigEntry,
    tracker: T,
    settings: SensorSettings,
    config: DeliveryConfig,
    extra: Option<Attributes>,
    delivery: Option<Arc<DeliverySensor<T>>>,
    truck: Option<Arc<TruckSensor<T>>>,
    poll_handles: Vec<JoinHandle<()>>,
}

impl<T> DeliveryIntegration<T>
where
    T: TrackerApi + Clone + 'static,
{
    #[must_use]
    pub fn new(
        entry: ConfigEntry,
        tracker: T,
        settings: SensorSettings,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            entry,
            tracker,
            settings,
            config,
            extra: None,
            delivery: None,
            truck: None,
            poll_handles: Vec::new(),
        }
    }

    /// Static attributes merged into the delivery entity.
    #[must_use]
    pub fn with_extra_attributes(mut self, extra: Attributes) -> Self {
        self.extra = Some(extra).filter(|extra| !extra.is_empty());
        self
    }

    /// Ids of the registered entities, delivery first. Empty before setup.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let delivery = self.delivery.as_ref().map(|sensor| sensor.id());
        let truck = self.truck.as_ref().map(|sensor| sensor.id());
        delivery.into_iter().chain(truck).collect()
    }

    async fn discover_route(&self) -> Option<RouteId> {
        let search = GeoSearch::new(self.tracker.clone(), self.settings.radius);
        match search.find_nearest_stop(self.entry.home.coordinate()).await {
            Ok(stop) => {
                tracing::info!(route_id = %stop.route_id, stop_id = %stop.stop_id, "route discovered");
                Some(stop.route_id)
            }
            Err(err) => {
                tracing::warn!(%err, kind = err.kind(), "route discovery failed; truck waits for first delivery poll");
                None
            }
        }
    }
}

/// First update then registration, logging instead of failing on update
/// errors.
async fn register<S, C>(sensor: &S, ctx: &C) -> Result<Entity, HemglassError>
where
    S: PollingSensor,
    C: IntegrationContext,
{
    if let Err(err) = sensor.update(false).await {
        tracing::warn!(%err, kind = err.kind(), entity_id = %sensor.id(), "initial update failed");
    }
    ctx.upsert_entity(sensor.entity().await?).await
}

/// Forward a service call to `sensor`.
async fn call<S: PollingSensor>(sensor: &S, service: &str) -> Result<Entity, HemglassError> {
    if service != UPDATE_ENTITY {
        return Err(ValidationError::UnsupportedService(service.to_string()).into());
    }
    sensor.update(true).await?;
    sensor.entity().await
}

impl<T> Integration for DeliveryIntegration<T>
where
    T: TrackerApi + Clone + 'static,
{
    fn name(&self) -> &'static str {
        hemglass_app::sensors::DOMAIN
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), HemglassError> {
        let route_id = self.discover_route().await;

        let mut delivery =
            DeliverySensor::new(&self.entry, self.tracker.clone(), self.settings, route_id);
        if let Some(extra) = self.extra.clone() {
            delivery = delivery.with_extra_attributes(Box::new(extra));
        }
        let truck = TruckSensor::new(
            &self.entry,
            self.tracker.clone(),
            self.settings,
            delivery.route_updates(),
        );

        let delivery_entity = register(&delivery, ctx).await?;
        let truck_entity = register(&truck, ctx).await?;
        tracing::info!(
            delivery = %delivery_entity.entity_id,
            truck = %truck_entity.entity_id,
            "hemglass entities registered"
        );

        self.delivery = Some(Arc::new(delivery));
        self.truck = Some(Arc::new(truck));
        Ok(())
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), HemglassError> {
        if let Some(delivery) = &self.delivery {
            self.poll_handles.push(tokio::spawn(poller::poll_loop(
                Arc::clone(delivery),
                ctx.clone(),
                self.config.scan_interval(),
            )));
        }
        if let Some(truck) = &self.truck {
            self.poll_handles.push(tokio::spawn(poller::poll_loop(
                Arc::clone(truck),
                ctx,
                self.config.truck_scan_interval(),
            )));
        }
        tracing::info!(
            loops = self.poll_handles.len(),
            scan_interval_secs = self.config.scan_interval_secs,
            truck_scan_interval_secs = self.config.truck_scan_interval_secs,
            "hemglass poll loops started"
        );
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        _data: serde_json::Value,
    ) -> Result<Entity, HemglassError> {
        if let Some(delivery) = self.delivery.as_deref().filter(|s| s.id() == entity_id) {
            return call(delivery, service).await;
        }
        if let Some(truck) = self.truck.as_deref().filter(|s| s.id() == entity_id) {
            return call(truck, service).await;
        }
        Err(NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        }
        .into())
    }

    async fn teardown(&mut self) -> Result<(), HemglassError> {
        for handle in self.poll_handles.drain(..) {
            handle.abort();
        }
        tracing::debug!("hemglass poll loops aborted");
        self.delivery = None;
        self.truck = None;
        tracing::info!("hemglass integration stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use hemglass_app::event_bus::InProcessEventBus;
    use hemglass_app::services::entity_registry::EntityRegistry;
    use hemglass_domain::delivery::{LiveIndex, LiveRouteInfo, RouteForecast, SalesInfo, Stop};
    use hemglass_domain::entity::{AttributeValue, EntityState};
    use hemglass_domain::event::EventType;
    use hemglass_domain::geo::{BoundingBox, HomeLocation};
    use hemglass_domain::id::StopId;

    #[derive(Default)]
    struct StubTracker {
        down: AtomicBool,
    }

    impl StubTracker {
        fn check(&self) -> Result<(), HemglassError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(HemglassError::Network(Box::new(std::io::Error::other(
                    "tracker down",
                ))));
            }
            Ok(())
        }
    }

    impl TrackerApi for StubTracker {
        async fn nearest_stops(
            &self,
            _bbox: BoundingBox,
            _limit: u32,
        ) -> Result<Vec<Stop>, HemglassError> {
            self.check()?;
            Ok(vec![Stop {
                stop_id: StopId::new("42"),
                latitude: 59.331,
                longitude: 18.061,
                next_date: "2026-10-21T00:00:00".to_string(),
                next_time: "17:10".to_string(),
                route_id: RouteId::new("7"),
            }])
        }

        async fn sales_info(&self, _stop_id: &StopId) -> Result<SalesInfo, HemglassError> {
            self.check()?;
            Ok(SalesInfo {
                depot_name: "solna".to_string(),
                ..SalesInfo::default()
            })
        }

        async fn stop_eta(
            &self,
            _stop_id: &StopId,
            _route_id: &RouteId,
        ) -> Result<String, HemglassError> {
            self.check()?;
            Ok("14:05".to_string())
        }

        async fn live_route_info(
            &self,
            _route_id: &RouteId,
        ) -> Result<Option<LiveRouteInfo>, HemglassError> {
            self.check()?;
            Ok(Some(LiveRouteInfo {
                indices: vec![LiveIndex {
                    index: 2,
                    time: "14:05:00".to_string(),
                }],
                is_off_track: Some(false),
            }))
        }

        async fn route_forecast(
            &self,
            _route_id: &RouteId,
        ) -> Result<Option<RouteForecast>, HemglassError> {
            self.check()?;
            Ok(Some(RouteForecast(vec![
                "59.1,18.0".to_string(),
                "59.2,18.1".to_string(),
            ])))
        }
    }

    type Registry = Arc<EntityRegistry<InProcessEventBus>>;

    fn entry() -> ConfigEntry {
        ConfigEntry::new(HomeLocation::parse("Home", "59.33", "18.06").unwrap())
    }

    fn integration(tracker: &Arc<StubTracker>) -> DeliveryIntegration<Arc<StubTracker>> {
        let settings = SensorSettings {
            min_interval: Duration::ZERO,
            ..SensorSettings::default()
        };
        let config = DeliveryConfig {
            scan_interval_secs: 60,
            truck_scan_interval_secs: 60,
        };
        DeliveryIntegration::new(entry(), Arc::clone(tracker), settings, config)
    }

    fn registry() -> (Registry, InProcessEventBus) {
        let bus = InProcessEventBus::new(64);
        (Arc::new(EntityRegistry::new(bus.clone())), bus)
    }

    #[tokio::test]
    async fn should_register_both_entities_on_setup() {
        let tracker = Arc::new(StubTracker::default());
        let (registry, _bus) = registry();
        let mut integration = integration(&tracker);

        integration.setup(&registry).await.unwrap();

        let entities = registry.list_entities().await;
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_id, "sensor.hemglass_home");
        assert_eq!(entities[0].state, EntityState::Value("2026-10-21".to_string()));
        assert_eq!(entities[0].get_attribute("depot"), Some(&AttributeValue::from("Solna")));
        assert_eq!(entities[1].entity_id, "sensor.hemglass_home_truck");
        assert_eq!(entities[1].state, EntityState::On);
        assert_eq!(entities[1].get_attribute("truckLatitude"), Some(&AttributeValue::from("59.2")));
        assert_eq!(integration.entity_ids().len(), 2);
    }

    #[tokio::test]
    async fn should_register_unknown_entities_when_tracker_is_down() {
        let tracker = Arc::new(StubTracker::default());
        tracker.down.store(true, Ordering::SeqCst);
        let (registry, _bus) = registry();
        let mut integration = integration(&tracker);

        integration.setup(&registry).await.unwrap();

        let entities = registry.list_entities().await;
        assert_eq!(entities.len(), 2);
        assert!(entities.iter().all(|e| e.state == EntityState::Unknown));
        assert!(entities.iter().all(|e| e.attributes.is_empty()));
    }

    #[tokio::test]
    async fn should_merge_extra_attributes_into_delivery_entity() {
        let tracker = Arc::new(StubTracker::default());
        let (registry, _bus) = registry();
        let extra = Attributes::from([("gate".to_string(), AttributeValue::from("1234"))]);
        let mut integration = integration(&tracker).with_extra_attributes(extra);

        integration.setup(&registry).await.unwrap();

        let delivery = registry.find_by_entity_id("sensor.hemglass_home").await.unwrap();
        let truck = registry.find_by_entity_id("sensor.hemglass_home_truck").await.unwrap();
        assert_eq!(delivery.get_attribute("gate"), Some(&AttributeValue::from("1234")));
        assert_eq!(truck.get_attribute("gate"), None);
    }

    #[tokio::test]
    async fn should_refresh_entity_on_update_service_call() {
        let tracker = Arc::new(StubTracker::default());
        tracker.down.store(true, Ordering::SeqCst);
        let (registry, _bus) = registry();
        let mut integration = integration(&tracker);
        integration.setup(&registry).await.unwrap();
        tracker.down.store(false, Ordering::SeqCst);

        let truck_id = integration.entity_ids()[1];
        let entity = integration
            .handle_service_call(truck_id, UPDATE_ENTITY, serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(entity.id, truck_id);
        assert_eq!(entity.state, EntityState::On);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_entity() {
        let tracker = Arc::new(StubTracker::default());
        let integration = integration(&tracker);
        let result = integration
            .handle_service_call(EntityId::new(), UPDATE_ENTITY, serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(HemglassError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_unsupported_service() {
        let tracker = Arc::new(StubTracker::default());
        let (registry, _bus) = registry();
        let mut integration = integration(&tracker);
        integration.setup(&registry).await.unwrap();

        let delivery_id = integration.entity_ids()[0];
        let result = integration
            .handle_service_call(delivery_id, "turn_on", serde_json::json!({}))
            .await;

        assert!(matches!(
            result,
            Err(HemglassError::Validation(ValidationError::UnsupportedService(ref s))) if s == "turn_on"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_poll_failure_from_background_loop() {
        let tracker = Arc::new(StubTracker::default());
        let (registry, bus) = registry();
        let mut integration = integration(&tracker);
        integration.setup(&registry).await.unwrap();
        let mut events = bus.subscribe();

        tracker.down.store(true, Ordering::SeqCst);
        integration.start_background(Arc::clone(&registry)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;

        let event = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = events.recv().await.unwrap();
                if event.event_type == EventType::PollFailed {
                    return event;
                }
            }
        })
        .await
        .expect("a poll failure should be published");
        assert_eq!(event.data["kind"], "network");

        let delivery = registry.find_by_entity_id("sensor.hemglass_home").await.unwrap();
        assert_eq!(delivery.state, EntityState::Value("2026-10-21".to_string()));

        integration.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn should_abort_poll_loops_on_teardown() {
        let tracker = Arc::new(StubTracker::default());
        let (registry, _bus) = registry();
        let mut integration = integration(&tracker);
        integration.setup(&registry).await.unwrap();
        integration.start_background(Arc::clone(&registry)).await.unwrap();
        assert_eq!(integration.poll_handles.len(), 2);

        integration.teardown().await.unwrap();

        assert!(integration.poll_handles.is_empty());
        assert!(integration.entity_ids().is_empty());
    }

    #[test]
    fn should_be_named_after_domain() {
        let tracker = Arc::new(StubTracker::default());
        assert_eq!(integration(&tracker).name(), "hemglass");
    }
}
