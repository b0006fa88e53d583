//! HTTP client for the tracker REST API.
//!
//! Wraps `reqwest` with tracker-specific envelope handling and typed
//! response deserialization.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use hemglass_app::ports::TrackerApi;
use hemglass_domain::delivery::{LiveRouteInfo, RouteForecast, SalesInfo, Stop};
use hemglass_domain::error::HemglassError;
use hemglass_domain::geo::BoundingBox;
use hemglass_domain::id::{RouteId, StopId};

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::types::{
    DataEnvelope, ForecastDto, LiveRouteInfoDto, STATUS_OK, SalesInfoDto, StatusEnvelope,
    StopDto, forecast_from_dto,
};

/// Client for the tracker REST API.
///
/// Use [`TrackerClient::new`] with a [`TrackerConfig`], or
/// [`TrackerClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: Client,
    base_url: Url,
}

impl TrackerClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TrackerError::InvalidBaseUrl`] if the base
    /// URL does not parse or cannot carry a path.
    pub fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("hemglass/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Exactly one trailing slash, so endpoint segments are appended to the
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| TrackerError::InvalidBaseUrl(config.base_url.clone()))?;

        Ok(Self { client, base_url })
    }

    /// Creates a client with default timeouts against `base_url`.
    ///
    /// # Errors
    ///
    /// Same as [`TrackerClient::new`].
    pub fn with_base_url(base_url: &str) -> Result<Self, TrackerError> {
        Self::new(&TrackerConfig {
            base_url: base_url.to_string(),
            ..TrackerConfig::default()
        })
    }

    /// Stops inside `bbox`, as returned by `getNearestStops`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Http`] on network failure or non-2xx HTTP status.
    /// - [`TrackerError::Deserialize`] if the body does not match.
    pub async fn get_nearest_stops(
        &self,
        bbox: BoundingBox,
        limit: u32,
    ) -> Result<Vec<Stop>, TrackerError> {
        let url = self.build_url(
            &["getNearestStops"],
            &[
                ("minLong", &bbox.min_long.to_string()),
                ("minLat", &bbox.min_lat.to_string()),
                ("maxLong", &bbox.max_long.to_string()),
                ("maxLat", &bbox.max_lat.to_string()),
                ("limit", &limit.to_string()),
            ],
        );
        let envelope: DataEnvelope<Vec<StopDto>> = self.request_json(&url).await?;
        Ok(envelope.data.into_iter().map(Stop::from).collect())
    }

    /// Sales info of one stop, as returned by `getSalesInfoByStop`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Http`] on network failure or non-2xx HTTP status.
    /// - [`TrackerError::Deserialize`] if the body does not match.
    pub async fn get_sales_info(&self, stop_id: &StopId) -> Result<SalesInfo, TrackerError> {
        let url = self.build_url(&["getSalesInfoByStop"], &[("stopId", stop_id.as_str())]);
        let envelope: DataEnvelope<SalesInfoDto> = self.request_json(&url).await?;
        Ok(envelope.data.into())
    }

    /// Raw `HH:MM` ETA from `stopsEta`; `null` becomes an empty string.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Http`] on network failure or non-2xx HTTP status.
    /// - [`TrackerError::Deserialize`] if the body does not match.
    pub async fn get_stop_eta(
        &self,
        stop_id: &StopId,
        route_id: &RouteId,
    ) -> Result<String, TrackerError> {
        let url = self.build_url(
            &["stopsEta"],
            &[("stopId", stop_id.as_str()), ("routeId", route_id.as_str())],
        );
        let envelope: DataEnvelope<Option<String>> = self.request_json(&url).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Live progress from `liverouteinfo/{routeId}`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Http`] on network failure or non-2xx HTTP status.
    /// - [`TrackerError::Deserialize`] if the body does not match.
    pub async fn get_live_route_info(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<LiveRouteInfo>, TrackerError> {
        let url = self.build_url(&["liverouteinfo", route_id.as_str()], &[]);
        let live: Option<LiveRouteInfoDto> = self.request_status(&url).await?;
        Ok(live.map(LiveRouteInfo::from))
    }

    /// Forecast path from `routeforecast/{routeId}`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Http`] on network failure or non-2xx HTTP status.
    /// - [`TrackerError::Deserialize`] if the body does not match.
    pub async fn get_route_forecast(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<RouteForecast>, TrackerError> {
        let url = self.build_url(&["routeforecast", route_id.as_str()], &[]);
        let points: Option<ForecastDto> = self.request_status(&url).await?;
        Ok(points.map(forecast_from_dto))
    }

    /// Appends percent-encoded path `segments` and `query` pairs to the base
    /// URL.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body.
    async fn request_json<R: DeserializeOwned>(&self, url: &Url) -> Result<R, TrackerError> {
        tracing::debug!(%url, "tracker request");
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| TrackerError::Deserialize {
            context: url.path().to_string(),
            source,
        })
    }

    /// Like [`request_json`](Self::request_json) for `{statusCode, data}`
    /// envelopes: `None` unless the status is OK.
    async fn request_status<R: DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<Option<R>, TrackerError> {
        let envelope: StatusEnvelope = self.request_json(url).await?;
        if envelope.status_code != STATUS_OK {
            tracing::debug!(%url, status_code = envelope.status_code, "no live data");
        }
        envelope
            .into_data()
            .map_err(|source| TrackerError::Deserialize {
                context: url.path().to_string(),
                source,
            })
    }
}

impl TrackerApi for TrackerClient {
    async fn nearest_stops(
        &self,
        bbox: BoundingBox,
        limit: u32,
    ) -> Result<Vec<Stop>, HemglassError> {
        Ok(self.get_nearest_stops(bbox, limit).await?)
    }

    async fn sales_info(&self, stop_id: &StopId) -> Result<SalesInfo, HemglassError> {
        Ok(self.get_sales_info(stop_id).await?)
    }

    async fn stop_eta(
        &self,
        stop_id: &StopId,
        route_id: &RouteId,
    ) -> Result<String, HemglassError> {
        Ok(self.get_stop_eta(stop_id, route_id).await?)
    }

    async fn live_route_info(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<LiveRouteInfo>, HemglassError> {
        Ok(self.get_live_route_info(route_id).await?)
    }

    async fn route_forecast(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<RouteForecast>, HemglassError> {
        Ok(self.get_route_forecast(route_id).await?)
    }
}
