//! Entity: the state holder the hub exposes for each polled sensor.
//!
//! An entity has one primary [`EntityState`] (e.g. the next delivery date)
//! plus a string-keyed map of auxiliary [`AttributeValue`]s. Both are
//! replaced wholesale on every successful poll.

mod attribute_value;
mod state;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use crate::error::{HemglassError, ValidationError};
use crate::id::EntityId;
use crate::time::{Timestamp, now};

/// Ordered attribute map, so snapshots serialize deterministically.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single observable state holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Human-readable slug, e.g. `sensor.hemglass_home`.
    pub entity_id: String,
    /// Stable id derived from the config entry.
    pub unique_id: String,
    pub friendly_name: String,
    pub icon: Option<String>,
    pub state: EntityState,
    pub attributes: Attributes,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Validation`] when `entity_id` or
    /// `friendly_name` is empty.
    pub fn validate(&self) -> Result<(), HemglassError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Replace state and attributes, bumping `last_changed` only when the
    /// primary state actually differs.
    pub fn apply(&mut self, state: EntityState, attributes: Attributes, at: Timestamp) {
        if self.state != state {
            self.last_changed = at;
        }
        self.state = state;
        self.attributes = attributes;
        self.last_updated = at;
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    entity_id: Option<String>,
    unique_id: Option<String>,
    friendly_name: Option<String>,
    icon: Option<String>,
    state: EntityState,
    attributes: Attributes,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Validation`] if `entity_id` or
    /// `friendly_name` is missing or empty.
    pub fn build(self) -> Result<Entity, HemglassError> {
        let ts = now();
        let entity_id = self.entity_id.unwrap_or_default();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_else(|| entity_id.clone()),
            entity_id,
            friendly_name: self.friendly_name.unwrap_or_default(),
            icon: self.icon,
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}
