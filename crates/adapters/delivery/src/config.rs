//! Delivery integration configuration.

use std::time::Duration;

use serde::Deserialize;

/// Background polling cadence of the two sensors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Interval between delivery sensor ticks, in seconds.
    pub scan_interval_secs: u64,
    /// Interval between truck sensor ticks, in seconds.
    pub truck_scan_interval_secs: u64,
}

impl DeliveryConfig {
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    #[must_use]
    pub fn truck_scan_interval(&self) -> Duration {
        Duration::from_secs(self.truck_scan_interval_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 30 * 60,
            truck_scan_interval_secs: 30 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_tick_every_half_hour_by_default() {
        let config = DeliveryConfig::default();
        assert_eq!(config.scan_interval(), Duration::from_secs(1800));
        assert_eq!(config.truck_scan_interval(), Duration::from_secs(1800));
    }

    #[test]
    fn should_parse_partial_toml() {
        let config: DeliveryConfig = toml::from_str("truck_scan_interval_secs = 300").unwrap();
        assert_eq!(config.truck_scan_interval_secs, 300);
        assert_eq!(config.scan_interval_secs, 1800);
    }
}
