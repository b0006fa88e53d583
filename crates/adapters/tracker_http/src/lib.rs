//! # hemglass-adapter-tracker-http
//!
//! Implements the [`TrackerApi`](hemglass_app::ports::TrackerApi) port
//! against the Hemglass tracker REST API.
//!
//! ## Endpoints
//!
//! | Path | Query | Envelope |
//! |------|-------|----------|
//! | `getNearestStops` | `minLong`, `minLat`, `maxLong`, `maxLat`, `limit` | `{data}` |
//! | `getSalesInfoByStop` | `stopId` | `{data}` |
//! | `stopsEta` | `stopId`, `routeId` | `{data}` |
//! | `liverouteinfo/{routeId}` | | `{statusCode, data}` |
//! | `routeforecast/{routeId}` | | `{statusCode, data}` |
//!
//! A `statusCode` other than 200 inside the envelope means the route has no
//! live data today and is returned as `Ok(None)`.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `hemglass-app` and `hemglass-domain`.

mod client;
mod config;
mod error;
mod types;

pub use client::TrackerClient;
pub use config::{DEFAULT_BASE_URL, TrackerConfig};
pub use error::TrackerError;
