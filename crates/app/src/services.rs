//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod config_flow;
pub mod entity_registry;
pub mod geo_search;
pub mod live_route;
pub mod stop_metadata;
