//! Entity registry: the hub's in-memory view of every published entity.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::RwLock;

use hemglass_domain::entity::Entity;
use hemglass_domain::error::{HemglassError, NotFoundError};
use hemglass_domain::event::{Event, EventType};
use hemglass_domain::id::EntityId;
use hemglass_domain::time::now;

use crate::ports::{EventPublisher, IntegrationContext};

/// Latest snapshot of each entity, announced on the event bus as it changes.
///
/// Nothing is persisted; a restart starts from an empty registry.
pub struct EntityRegistry<EP> {
    entities: RwLock<HashMap<EntityId, Entity>>,
    publisher: EP,
}

impl<EP: EventPublisher + Send + Sync> EntityRegistry<EP> {
    pub fn new(publisher: EP) -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            publisher,
        }
    }

    /// Store `entity`, emitting `EntityCreated` on first sight and
    /// `StateChanged` when its primary state differs from the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::Validation`] if the entity violates its
    /// invariants, or an error from the event publisher.
    pub async fn upsert(&self, mut entity: Entity) -> Result<Entity, HemglassError> {
        entity.validate()?;

        let event = {
            let mut entities = self.entities.write().await;
            let event = match entities.get(&entity.id) {
                None => Some(Event::new(
                    EventType::EntityCreated,
                    Some(entity.id),
                    serde_json::json!({
                        "entity_id": entity.entity_id,
                        "state": entity.state.to_string(),
                    }),
                )),
                Some(previous) => {
                    let at = now();
                    let state = entity.state.clone();
                    let attributes = std::mem::take(&mut entity.attributes);
                    let from = previous.state.to_string();
                    let mut merged = previous.clone();
                    merged.friendly_name = entity.friendly_name;
                    merged.icon = entity.icon;
                    merged.apply(state, attributes, at);
                    entity = merged;
                    (from != entity.state.to_string()).then(|| {
                        Event::new(
                            EventType::StateChanged,
                            Some(entity.id),
                            serde_json::json!({
                                "entity_id": entity.entity_id,
                                "from": from,
                                "to": entity.state.to_string(),
                            }),
                        )
                    })
                }
            };
            entities.insert(entity.id, entity.clone());
            event
        };

        if let Some(event) = event {
            self.publisher.publish(event).await?;
        }
        Ok(entity)
    }

    /// Look up an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`HemglassError::NotFound`] when no entity with `id` exists.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, HemglassError> {
        self.entities.read().await.get(&id).cloned().ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Look up an entity by its slug (e.g. `sensor.hemglass_home`).
    pub async fn find_by_entity_id(&self, entity_id: &str) -> Option<Entity> {
        self.entities
            .read()
            .await
            .values()
            .find(|entity| entity.entity_id == entity_id)
            .cloned()
    }

    /// All entities, ordered by slug.
    pub async fn list_entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.entities.read().await.values().cloned().collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }
}

impl<EP> IntegrationContext for EntityRegistry<EP>
where
    EP: EventPublisher + Send + Sync,
{
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, HemglassError>> + Send {
        self.upsert(entity)
    }

    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HemglassError>> + Send {
        self.publisher.publish(event)
    }
}
