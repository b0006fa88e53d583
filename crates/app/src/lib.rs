//! # hemglass-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TrackerApi`: the five read-only endpoints of the delivery tracker
//!   - `EventPublisher`: fan-out of domain events
//!   - `IntegrationContext`: where integrations hand their entities
//! - Define **driving/inbound ports**:
//!   - `Integration`: lifecycle of a pluggable integration
//! - Implement the use-cases on top of the tracker port:
//!   - `GeoSearch`: nearest stop around the home location
//!   - `StopMetadata`: sales/depot info and the localized ETA
//!   - `LiveRouteResolver`: live truck position along the forecast path
//!   - `ConfigFlow`: validation of user-supplied setup data
//! - Provide the **polling sensors** (delivery, truck) and their throttle
//! - Provide **in-process infrastructure** (event bus, entity registry)
//!
//! ## Dependency rule
//! Depends on `hemglass-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod sensors;
pub mod services;

#[cfg(test)]
mod test_support;
