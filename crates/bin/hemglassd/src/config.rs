//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `hemglass.toml` in the working directory. Every field except the
//! home location has a sensible default so the file is optional when the
//! location comes from the environment. Environment variables take
//! precedence over file values.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use hemglass_adapter_delivery::DeliveryConfig;
use hemglass_adapter_tracker_http::{DEFAULT_BASE_URL, TrackerConfig};
use hemglass_app::sensors::SensorSettings;
use hemglass_app::services::config_flow::UserInput;
use hemglass_domain::entity::{AttributeValue, Attributes};
use hemglass_domain::geo::SearchRadius;
use hemglass_domain::time::TimeZones;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The location to track deliveries for.
    pub home: HomeConfig,
    /// Tracker API settings.
    pub tracker: TrackerSection,
    /// Polling cadence.
    pub polling: PollingConfig,
    /// Time zones used to localize tracker clock times.
    pub time: TimeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Home location, kept as text and validated by the setup flow.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// Display name; also part of entity ids.
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    /// Static attributes added to the delivery entity.
    pub attributes: BTreeMap<String, String>,
}

/// Tracker API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrackerSection {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Half side of the stop search box, in degrees.
    pub search_radius_deg: f64,
}

/// Poll cadence and throttling.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub scan_interval_secs: u64,
    /// Minimum time between two poll cycles of one sensor.
    pub min_interval_secs: u64,
    pub truck_scan_interval_secs: u64,
}

/// IANA time zone names.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Zone the tracker reports clock times in.
    pub source_tz: String,
    /// Zone clock times are displayed in.
    pub local_tz: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `hemglass.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("hemglass.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HEMGLASS_HOME_NAME") {
            self.home.name = val;
        }
        if let Some(val) = var("HEMGLASS_HOME_LATITUDE") {
            self.home.latitude = val;
        }
        if let Some(val) = var("HEMGLASS_HOME_LONGITUDE") {
            self.home.longitude = val;
        }
        if let Some(val) = var("HEMGLASS_TRACKER_URL") {
            self.tracker.base_url = val;
        }
        if let Some(val) = var("HEMGLASS_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("tracker.request_timeout_secs", self.tracker.request_timeout_secs),
            ("tracker.connect_timeout_secs", self.tracker.connect_timeout_secs),
            ("polling.scan_interval_secs", self.polling.scan_interval_secs),
            ("polling.truck_scan_interval_secs", self.polling.truck_scan_interval_secs),
        ];
        if let Some((field, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Validation(format!("{field} must be non-zero")));
        }
        self.search_radius()?;
        self.time_zones()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a non-positive radius.
    pub fn search_radius(&self) -> Result<SearchRadius, ConfigError> {
        SearchRadius::new(self.tracker.search_radius_deg)
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unknown zone name.
    pub fn time_zones(&self) -> Result<TimeZones, ConfigError> {
        Ok(TimeZones {
            source: parse_tz(&self.time.source_tz)?,
            local: parse_tz(&self.time.local_tz)?,
        })
    }

    /// Settings shared by both sensors.
    ///
    /// # Errors
    ///
    /// Same as [`Config::search_radius`] and [`Config::time_zones`].
    pub fn sensor_settings(&self) -> Result<SensorSettings, ConfigError> {
        Ok(SensorSettings {
            radius: self.search_radius()?,
            zones: self.time_zones()?,
            min_interval: Duration::from_secs(self.polling.min_interval_secs),
        })
    }

    #[must_use]
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            base_url: self.tracker.base_url.clone(),
            request_timeout_secs: self.tracker.request_timeout_secs,
            connect_timeout_secs: self.tracker.connect_timeout_secs,
        }
    }

    #[must_use]
    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            scan_interval_secs: self.polling.scan_interval_secs,
            truck_scan_interval_secs: self.polling.truck_scan_interval_secs,
        }
    }

    /// The home location as setup form input.
    #[must_use]
    pub fn user_input(&self) -> UserInput {
        UserInput {
            name: self.home.name.clone(),
            latitude: self.home.latitude.clone(),
            longitude: self.home.longitude.clone(),
        }
    }

    #[must_use]
    pub fn extra_attributes(&self) -> Attributes {
        self.home
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), AttributeValue::from(value.as_str())))
            .collect()
    }
}

fn parse_tz(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|err| ConfigError::Validation(format!("unknown time zone {name:?}: {err}")))
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            name: "Home".to_string(),
            latitude: String::new(),
            longitude: String::new(),
            attributes: BTreeMap::new(),
        }
    }
}

impl Default for TrackerSection {
    fn default() -> Self {
        let client = TrackerConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: client.request_timeout_secs,
            connect_timeout_secs: client.connect_timeout_secs,
            search_radius_deg: SearchRadius::POLL.degrees(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        let delivery = DeliveryConfig::default();
        Self {
            scan_interval_secs: delivery.scan_interval_secs,
            min_interval_secs: 60 * 60,
            truck_scan_interval_secs: delivery.truck_scan_interval_secs,
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            source_tz: "UTC".to_string(),
            local_tz: "Europe/Stockholm".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hemglass=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
