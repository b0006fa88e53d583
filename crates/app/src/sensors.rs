//! Polling sensors: the entities the integration keeps fresh.
//!
//! Each sensor owns its published state and a [`Throttle`]. An update runs
//! the whole request chain first and swaps the result into the published
//! state only once every call succeeded, so a failed poll never leaves a
//! half-updated entity behind.

pub mod delivery;
pub mod throttle;
pub mod truck;

use std::future::Future;
use std::time::Duration;

use hemglass_domain::config_entry::ConfigEntry;
use hemglass_domain::entity::{Attributes, Entity, EntityState};
use hemglass_domain::error::HemglassError;
use hemglass_domain::geo::SearchRadius;
use hemglass_domain::id::EntityId;
use hemglass_domain::time::TimeZones;

pub use delivery::DeliverySensor;
pub use throttle::Throttle;
pub use truck::TruckSensor;

/// Integration domain, used as prefix for slugs and unique ids.
pub const DOMAIN: &str = "hemglass";

/// Published state of a sensor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PollState<T> {
    /// No poll has completed yet; no derived attributes exist.
    #[default]
    Uninitialized,
    Populated(T),
}

impl<T> PollState<T> {
    #[must_use]
    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Uninitialized => None,
            Self::Populated(value) => Some(value),
        }
    }
}

/// Result of asking a sensor to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polled {
    /// A full cycle ran and the published state was replaced.
    Refreshed,
    /// The tick was dropped: a cycle is running, the minimum interval has
    /// not elapsed, or there is nothing to poll yet.
    Suppressed,
}

/// Extra attributes merged over a sensor's computed attributes.
///
/// Resolved once at construction; the returned map wins on key clashes and
/// is exposed even before the first successful poll.
pub trait ExtraAttributes: Send + Sync {
    fn extra_attributes(&self) -> Attributes;
}

impl ExtraAttributes for Attributes {
    fn extra_attributes(&self) -> Attributes {
        self.clone()
    }
}

/// Knobs shared by both sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSettings {
    pub radius: SearchRadius,
    pub zones: TimeZones,
    /// Minimum time between the starts of two poll cycles.
    pub min_interval: Duration,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            radius: SearchRadius::default(),
            zones: TimeZones::default(),
            min_interval: Duration::from_secs(60 * 60),
        }
    }
}

/// A sensor that can be polled and rendered as an [`Entity`].
pub trait PollingSensor: Send + Sync {
    /// The hub id of the entity this sensor renders.
    fn id(&self) -> EntityId;

    /// Run one poll cycle. `force` skips the minimum interval but never
    /// overlaps a running cycle.
    fn update(&self, force: bool) -> impl Future<Output = Result<Polled, HemglassError>> + Send;

    /// Current snapshot of the entity.
    fn entity(&self) -> impl Future<Output = Result<Entity, HemglassError>> + Send;
}

/// Identity fields shared by every snapshot of one sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SensorIdentity {
    pub id: EntityId,
    pub entity_id: String,
    pub unique_id: String,
    pub friendly_name: String,
    pub icon: &'static str,
}

impl SensorIdentity {
    pub fn new(entry: &ConfigEntry, suffix: Option<&str>, icon: &'static str) -> Self {
        let slug = slugify(&entry.title);
        let mut unique_id = entry.unique_id(DOMAIN);
        let (entity_id, friendly_name) = match suffix {
            Some(suffix) => {
                unique_id = format!("{unique_id}_{suffix}");
                (
                    format!("sensor.{DOMAIN}_{slug}_{suffix}"),
                    format!("{} {suffix}", entry.title),
                )
            }
            None => (format!("sensor.{DOMAIN}_{slug}"), entry.title.clone()),
        };
        Self {
            id: EntityId::new(),
            entity_id,
            unique_id,
            friendly_name,
            icon,
        }
    }

    pub fn render(
        &self,
        state: EntityState,
        attributes: Attributes,
        extra: Option<&dyn ExtraAttributes>,
    ) -> Result<Entity, HemglassError> {
        let mut attributes = attributes;
        if let Some(extra) = extra {
            attributes.extend(extra.extra_attributes());
        }
        Entity::builder()
            .id(self.id)
            .entity_id(&self.entity_id)
            .unique_id(&self.unique_id)
            .friendly_name(&self.friendly_name)
            .icon(self.icon)
            .state(state)
            .attributes(attributes)
            .build()
    }
}

/// Lower-case ASCII slug, non-alphanumerics collapsed to `_`.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
