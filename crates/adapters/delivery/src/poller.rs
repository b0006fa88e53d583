//! Background poll loop shared by both sensors.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use hemglass_app::ports::IntegrationContext;
use hemglass_app::sensors::{Polled, PollingSensor};
use hemglass_domain::event::{Event, EventType};

/// Poll `sensor` every `period` until the task is aborted.
///
/// The first tick is skipped since setup already ran the initial update.
pub(crate) async fn poll_loop<S, C>(sensor: Arc<S>, ctx: C, period: Duration)
where
    S: PollingSensor,
    C: IntegrationContext,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        poll_once(sensor.as_ref(), &ctx).await;
    }
}

/// Run one tick: refresh the sensor and hand the new snapshot to `ctx`.
///
/// Failures are logged and published as [`EventType::PollFailed`]; the
/// sensor keeps its previous state and the next tick tries again.
pub(crate) async fn poll_once<S, C>(sensor: &S, ctx: &C)
where
    S: PollingSensor,
    C: IntegrationContext,
{
    let entity_id = sensor.id();
    match sensor.update(false).await {
        Ok(Polled::Refreshed) => {
            let published = match sensor.entity().await {
                Ok(entity) => ctx.upsert_entity(entity).await.map(|_| ()),
                Err(err) => Err(err),
            };
            if let Err(err) = published {
                tracing::warn!(%err, %entity_id, "failed to publish refreshed entity");
            }
        }
        Ok(Polled::Suppressed) => {
            tracing::trace!(%entity_id, "tick suppressed");
        }
        Err(err) => {
            tracing::warn!(
                %err,
                kind = err.kind(),
                %entity_id,
                "poll failed, keeping previous state; retrying next interval"
            );
            let event = Event::new(
                EventType::PollFailed,
                Some(entity_id),
                serde_json::json!({
                    "kind": err.kind(),
                    "error": err.to_string(),
                }),
            );
            if let Err(err) = ctx.publish(event).await {
                tracing::debug!(%err, "failed to publish poll failure");
            }
        }
    }
}
