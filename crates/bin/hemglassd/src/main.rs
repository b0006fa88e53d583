//! # hemglassd
//!
//! Composition root that wires the tracker client into the delivery
//! integration and keeps it polling until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Validate the home location through the setup flow
//! - Construct the event bus and entity registry
//! - Set up the delivery integration and start its poll loops
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use hemglass_adapter_delivery::DeliveryIntegration;
use hemglass_adapter_tracker_http::TrackerClient;
use hemglass_app::event_bus::InProcessEventBus;
use hemglass_app::ports::Integration;
use hemglass_app::services::config_flow::{ConfigFlow, FlowResult};
use hemglass_app::services::entity_registry::EntityRegistry;
use hemglass_app::services::geo_search::GeoSearch;
use hemglass_domain::event::Event;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Tracker
    let tracker = Arc::new(TrackerClient::new(&config.tracker_config())?);
    let settings = config.sensor_settings()?;

    // Setup flow
    let flow = ConfigFlow::new(GeoSearch::new(Arc::clone(&tracker), settings.radius));
    let entry = match flow.submit(&config.user_input()).await {
        FlowResult::CreateEntry(entry) => entry,
        FlowResult::ShowForm { errors } => {
            let codes: Vec<&str> = errors.values().map(String::as_str).collect();
            return Err(format!("home location rejected: {}", codes.join(", ")).into());
        }
    };

    // Event bus
    let event_bus = InProcessEventBus::new(256);
    let event_log = tokio::spawn(log_events(event_bus.subscribe()));

    // Registry
    let registry = Arc::new(EntityRegistry::new(event_bus));

    // Integration
    let mut integration =
        DeliveryIntegration::new(entry, tracker, settings, config.delivery_config())
            .with_extra_attributes(config.extra_attributes());
    integration.setup(&registry).await?;
    integration.start_background(Arc::clone(&registry)).await?;

    tracing::info!(integration = integration.name(), "hemglassd running");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");

    integration.teardown().await?;
    event_log.abort();

    for entity in registry.list_entities().await {
        tracing::debug!(entity_id = %entity.entity_id, state = %entity.state, "final state");
    }

    Ok(())
}

/// Mirror every bus event into the log.
async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => tracing::info!(
                event_type = ?event.event_type,
                entity_id = ?event.entity_id,
                data = %event.data,
                "event"
            ),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
