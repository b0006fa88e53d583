//! # hemglass-domain
//!
//! Pure domain model for the hemglass delivery tracker.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Time-zone conversion of the bare clock strings the tracker reports
//! - Geography: the home location and the search box around it
//! - Delivery data: **Stops**, sales info, live route indices, route forecasts
//!   and the **truck position** derived from them
//! - Define **Entities** (state holders exposed to the hub) and **Events**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod config_entry;
pub mod delivery;
pub mod entity;
pub mod event;
pub mod geo;
