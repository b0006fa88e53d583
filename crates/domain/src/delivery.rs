//! Delivery data reported by the tracker and the truck position derived
//! from it.

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::id::{RouteId, StopId};

/// A fixed delivery checkpoint and its next scheduled visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: StopId,
    pub latitude: f64,
    pub longitude: f64,
    /// ISO-8601 date-time of the next visit, e.g. `2026-10-21T00:00:00`.
    pub next_date: String,
    /// Free-form visit window as published by the tracker.
    pub next_time: String,
    pub route_id: RouteId,
}

impl Stop {
    /// The calendar-date part of [`next_date`](Self::next_date).
    #[must_use]
    pub fn next_date_day(&self) -> &str {
        self.next_date
            .split_once('T')
            .map_or(self.next_date.as_str(), |(day, _)| day)
    }
}

/// Salesperson and depot contact details for a stop.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesInfo {
    pub salesman_name: String,
    pub phone_number: String,
    pub depot_name: String,
    pub depot_email: String,
    pub street_address: String,
    pub city: String,
    pub comment: String,
    pub cancelled: bool,
    pub cancelled_message: Option<String>,
}

impl SalesInfo {
    /// Presentation form: depot, street and city capitalized, and a missing
    /// cancellation message replaced by an empty string.
    #[must_use]
    pub fn for_display(self) -> Self {
        Self {
            depot_name: capitalize(&self.depot_name),
            street_address: capitalize(&self.street_address),
            city: capitalize(&self.city),
            cancelled_message: Some(self.cancelled_message.unwrap_or_default()),
            ..self
        }
    }
}

/// Upper-case the first character and lower-case the rest.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// One reported position of the truck along its forecast path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveIndex {
    /// 1-based position in the [`RouteForecast`].
    pub index: u32,
    /// Bare `HH:MM[:SS]` clock time of the report, in the source zone.
    pub time: String,
}

/// Live progress of a route that is running today.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiveRouteInfo {
    /// Most recent first; `indices[0]` is the current position.
    pub indices: Vec<LiveIndex>,
    pub is_off_track: Option<bool>,
}

impl LiveRouteInfo {
    #[must_use]
    pub fn current(&self) -> Option<&LiveIndex> {
        self.indices.first()
    }
}

/// The planned path of a route as `"lat,long"` points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteForecast(pub Vec<String>);

impl RouteForecast {
    /// Look up a 1-based position and split it into `(lat, long)` text.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::IndexOutOfBounds`] for index 0 or past the end,
    /// and [`RouteError::MalformedCoordinate`] when the point has no comma.
    pub fn point(&self, index: u32) -> Result<(String, String), RouteError> {
        let out_of_bounds = || RouteError::IndexOutOfBounds {
            index,
            len: self.0.len(),
        };
        let offset = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .ok_or_else(out_of_bounds)?;
        let raw = self.0.get(offset).ok_or_else(out_of_bounds)?;
        let (lat, long) = raw
            .split_once(',')
            .ok_or_else(|| RouteError::MalformedCoordinate(raw.clone()))?;
        Ok((lat.trim().to_string(), long.trim().to_string()))
    }
}

/// Whether the truck left its planned path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffTrack {
    Reported(bool),
    /// The tracker did not say; exposed as an empty string, not `false`.
    #[default]
    Unreported,
}

impl From<Option<bool>> for OffTrack {
    fn from(flag: Option<bool>) -> Self {
        flag.map_or(Self::Unreported, Self::Reported)
    }
}

/// Where the truck is right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckPosition {
    pub latitude: String,
    pub longitude: String,
    /// Local `HH:MM:SS` of the position report.
    pub updated: String,
    pub off_track: OffTrack,
}

/// Outcome of resolving a route's live position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TruckStatus {
    Active(TruckPosition),
    /// The route is not running (off-hours or not scheduled today).
    Inactive,
}

impl TruckStatus {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    #[must_use]
    pub fn position(&self) -> Option<&TruckPosition> {
        match self {
            Self::Active(position) => Some(position),
            Self::Inactive => None,
        }
    }
}

/// Everything one complete delivery poll produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub stop: Stop,
    pub sales: SalesInfo,
    /// Local `HH:MM`, or empty when the tracker has no estimate.
    pub eta: String,
    pub truck: TruckStatus,
}
