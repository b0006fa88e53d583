//! Delivery sensor: the next delivery at the stop nearest to home.
//!
//! One cycle chains four lookups: nearest stop, sales info, ETA and truck
//! position. The primary state is the date of the next visit.

use tokio::sync::{RwLock, watch};

use hemglass_domain::config_entry::ConfigEntry;
use hemglass_domain::delivery::DeliveryReport;
use hemglass_domain::entity::{AttributeValue, Attributes, Entity, EntityState};
use hemglass_domain::error::HemglassError;
use hemglass_domain::geo::Coordinate;
use hemglass_domain::id::{EntityId, RouteId};
use hemglass_domain::time::TimeZones;

use super::truck::truck_attributes;
use super::{ExtraAttributes, PollState, PollingSensor, Polled, SensorIdentity, SensorSettings, Throttle};
use crate::ports::TrackerApi;
use crate::services::geo_search::GeoSearch;
use crate::services::live_route::LiveRouteResolver;
use crate::services::stop_metadata::StopMetadata;

/// Attribute map describing a full delivery report.
#[must_use]
pub fn delivery_attributes(report: &DeliveryReport) -> Attributes {
    let stop = &report.stop;
    let sales = &report.sales;
    let mut attributes: Attributes = [
        ("latitude", AttributeValue::Float(stop.latitude)),
        ("longitude", AttributeValue::Float(stop.longitude)),
        ("streetAddress", sales.street_address.as_str().into()),
        ("city", sales.city.as_str().into()),
        ("time", stop.next_time.as_str().into()),
        ("ETA", report.eta.as_str().into()),
        ("salesman", sales.salesman_name.as_str().into()),
        ("phoneNumber", sales.phone_number.as_str().into()),
        ("depot", sales.depot_name.as_str().into()),
        ("email", sales.depot_email.as_str().into()),
        ("comment", sales.comment.as_str().into()),
        ("canceled", sales.cancelled.into()),
        (
            "canceledMessage",
            sales.cancelled_message.clone().unwrap_or_default().into(),
        ),
        ("truckIsActiveToday", report.truck.is_active().into()),
        ("routeID", stop.route_id.as_str().into()),
        ("stopID", stop.stop_id.as_str().into()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect();
    attributes.extend(truck_attributes(&report.truck));
    attributes
}

/// Polls the next delivery for the configured home location.
pub struct DeliverySensor<T> {
    identity: SensorIdentity,
    home: Coordinate,
    search: GeoSearch<T>,
    metadata: StopMetadata<T>,
    resolver: LiveRouteResolver<T>,
    zones: TimeZones,
    throttle: Throttle,
    state: RwLock<PollState<DeliveryReport>>,
    route: watch::Sender<Option<RouteId>>,
    extra: Option<Box<dyn ExtraAttributes>>,
}

impl<T: TrackerApi + Clone> DeliverySensor<T> {
    /// Create a sensor for `entry`. `route_id`, when known from setup, is
    /// handed to followers before the first poll.
    pub fn new(
        entry: &ConfigEntry,
        tracker: T,
        settings: SensorSettings,
        route_id: Option<RouteId>,
    ) -> Self {
        let (route, _) = watch::channel(route_id);
        Self {
            identity: SensorIdentity::new(entry, None, "mdi:calendar"),
            home: entry.home.coordinate(),
            search: GeoSearch::new(tracker.clone(), settings.radius),
            metadata: StopMetadata::new(tracker.clone(), settings.zones),
            resolver: LiveRouteResolver::new(tracker, settings.zones),
            zones: settings.zones,
            throttle: Throttle::new(settings.min_interval),
            state: RwLock::new(PollState::Uninitialized),
            route,
            extra: None,
        }
    }
}

impl<T: TrackerApi> DeliverySensor<T> {
    #[must_use]
    pub fn with_extra_attributes(mut self, extra: Box<dyn ExtraAttributes>) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Receiver following the route id this sensor last resolved.
    #[must_use]
    pub fn route_updates(&self) -> watch::Receiver<Option<RouteId>> {
        self.route.subscribe()
    }

    /// Published state, for inspection.
    pub async fn state(&self) -> PollState<DeliveryReport> {
        self.state.read().await.clone()
    }

    /// Run the full lookup chain without touching published state.
    async fn fetch_report(&self) -> Result<DeliveryReport, HemglassError> {
        let today = self.zones.today();
        let stop = self.search.find_nearest_stop(self.home).await?;
        let sales = self.metadata.fetch_sales_info(&stop.stop_id).await?;
        let eta = self
            .metadata
            .fetch_eta(&stop.stop_id, &stop.route_id, today)
            .await?;
        let truck = self
            .resolver
            .resolve_truck_position(&stop.route_id, today)
            .await?;
        Ok(DeliveryReport {
            stop,
            sales,
            eta,
            truck,
        })
    }

    async fn poll(&self, force: bool) -> Result<Polled, HemglassError> {
        let permit = if force {
            self.throttle.try_begin_forced()
        } else {
            self.throttle.try_begin()
        };
        let Some(_permit) = permit else {
            tracing::trace!(entity_id = %self.identity.entity_id, "delivery tick suppressed");
            return Ok(Polled::Suppressed);
        };

        let report = self.fetch_report().await?;

        let route_id = report.stop.route_id.clone();
        self.route.send_if_modified(|current| {
            if current.as_ref() == Some(&route_id) {
                return false;
            }
            tracing::info!(%route_id, "route changed");
            *current = Some(route_id);
            true
        });
        *self.state.write().await = PollState::Populated(report);
        Ok(Polled::Refreshed)
    }

    async fn snapshot(&self) -> Result<Entity, HemglassError> {
        let (state, attributes) = match &*self.state.read().await {
            PollState::Uninitialized => (EntityState::Unknown, Attributes::new()),
            PollState::Populated(report) => (
                EntityState::Value(report.stop.next_date_day().to_string()),
                delivery_attributes(report),
            ),
        };
        self.identity
            .render(state, attributes, self.extra.as_deref())
    }
}

impl<T: TrackerApi> PollingSensor for DeliverySensor<T> {
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
