//! Integration port: lifecycle and service-call handling for integrations.
//!
//! An integration bridges an external data source (here: the delivery
//! tracker) into the hub. It registers its entities on setup, keeps them
//! fresh from background tasks, and answers service calls directed at
//! entities it owns.

use std::future::Future;
use std::sync::Arc;

use hemglass_domain::entity::Entity;
use hemglass_domain::error::HemglassError;
use hemglass_domain::event::Event;
use hemglass_domain::id::EntityId;

/// Context provided to integrations for publishing their entities.
///
/// This is a **port**: integrations call it whenever an entity snapshot
/// changes. The app crate provides
/// [`EntityRegistry`](crate::services::entity_registry::EntityRegistry) as
/// the in-process implementation.
pub trait IntegrationContext: Send + Sync {
    /// Store an entity snapshot (create or replace by [`EntityId`]).
    ///
    /// Also publishes `EntityCreated` / `StateChanged` events when
    /// appropriate.
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, HemglassError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HemglassError>> + Send;
}

impl<T: IntegrationContext> IntegrationContext for Arc<T> {
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, HemglassError>> + Send {
        (**self).upsert_entity(entity)
    }

    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HemglassError>> + Send {
        (**self).publish(event)
    }
}

/// A pluggable integration.
///
/// Implementations live in adapter crates (e.g. `adapter_delivery`).
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): initialise and register entities
/// 2. [`start_background`](Self::start_background): spawn the poll loops
/// 3. (the daemon runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown): stop background work
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"hemglass"`).
    fn name(&self) -> &'static str;

    /// Initialise and register entities via `ctx`.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HemglassError>> + Send;

    /// Start long-running background work.
    ///
    /// Spawns internal tasks that publish refreshed entities via `ctx` and
    /// returns immediately. The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), HemglassError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (e.g. `update_entity`) for an entity owned by
    /// this integration.
    ///
    /// Returns the entity snapshot after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, HemglassError>> + Send;

    /// Called on graceful shutdown. Clean up any background tasks.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HemglassError>> + Send;
}
