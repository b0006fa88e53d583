//! Wire types for the tracker API.
//!
//! The tracker is loose about JSON types: ids and indices arrive as numbers
//! or strings, and text fields may be `null`. These types absorb that and
//! convert into the domain model.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use hemglass_domain::delivery::{LiveIndex, LiveRouteInfo, RouteForecast, SalesInfo, Stop};
use hemglass_domain::id::{RouteId, StopId};

/// Status code the tracker uses for "live data follows".
pub(crate) const STATUS_OK: i64 = 200;

/// Plain `{ "data": ... }` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// `{ "statusCode": ..., "data": ... }` envelope. `data` is left raw because
/// its shape is only meaningful when the status is [`STATUS_OK`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusEnvelope {
    pub status_code: i64,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl StatusEnvelope {
    /// Decode `data` when the status is OK, `None` otherwise.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<Option<T>, serde_json::Error> {
        if self.status_code != STATUS_OK {
            return Ok(None);
        }
        serde_json::from_value(self.data).map(Some)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StopDto {
    #[serde(deserialize_with = "flexible_string")]
    pub stop_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub next_date: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub next_time: String,
    #[serde(deserialize_with = "flexible_string")]
    pub route_id: String,
}

impl From<StopDto> for Stop {
    fn from(dto: StopDto) -> Self {
        Self {
            stop_id: StopId::new(dto.stop_id),
            latitude: dto.latitude,
            longitude: dto.longitude,
            next_date: dto.next_date,
            next_time: dto.next_time,
            route_id: RouteId::new(dto.route_id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SalesInfoDto {
    #[serde(default, deserialize_with = "nullable_string")]
    pub salesman_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub depot_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub depot_email: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub street_address: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub comment: String,
    #[serde(default)]
    pub cancelled: Option<bool>,
    #[serde(default)]
    pub cancelled_message: Option<String>,
}

impl From<SalesInfoDto> for SalesInfo {
    fn from(dto: SalesInfoDto) -> Self {
        Self {
            salesman_name: dto.salesman_name,
            phone_number: dto.phone_number,
            depot_name: dto.depot_name,
            depot_email: dto.depot_email,
            street_address: dto.street_address,
            city: dto.city,
            comment: dto.comment,
            cancelled: dto.cancelled.unwrap_or(false),
            cancelled_message: dto.cancelled_message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LiveIndexDto {
    #[serde(deserialize_with = "flexible_index")]
    pub index: u32,
    #[serde(default, deserialize_with = "nullable_string")]
    pub time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LiveRouteInfoDto {
    #[serde(default)]
    pub indices: Vec<LiveIndexDto>,
    #[serde(default)]
    pub is_off_track: Option<bool>,
}

impl From<LiveRouteInfoDto> for LiveRouteInfo {
    fn from(dto: LiveRouteInfoDto) -> Self {
        Self {
            indices: dto
                .indices
                .into_iter()
                .map(|index| LiveIndex {
                    index: index.index,
                    time: index.time,
                })
                .collect(),
            is_off_track: dto.is_off_track,
        }
    }
}

/// Forecast points, one `"lat,long"` string each.
pub(crate) type ForecastDto = Vec<String>;

pub(crate) fn forecast_from_dto(points: ForecastDto) -> RouteForecast {
    RouteForecast(points)
}

/// A JSON scalar of unknown type.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Integer(number) => number.to_string(),
        Scalar::Float(number) => number.to_string(),
    })
}

fn flexible_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Integer(number) => u32::try_from(number).map_err(D::Error::custom),
        Scalar::Text(text) => text.trim().parse().map_err(D::Error::custom),
        Scalar::Float(number) => Err(D::Error::custom(format!(
            "expected an integer index, got {number}"
        ))),
    }
}
