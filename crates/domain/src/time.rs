//! Time and timestamp helpers.
//!
//! The tracker reports bare wall-clock strings (`"HH:MM"` for stop ETAs,
//! `"HH:MM:SS"` for truck position updates) in a fixed source time zone.
//! [`TimeZones::convert_clock`] anchors such a string on a calendar date and
//! re-expresses it in the local time zone of the delivery market.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ClockError;

/// UTC timestamp used for `last_changed`, `last_updated`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Output layout for a converted clock string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFormat {
    /// `HH:MM`, used for stop ETAs.
    HourMinute,
    /// `HH:MM:SS`, used for truck location updates.
    HourMinuteSecond,
}

impl ClockFormat {
    fn pattern(self) -> &'static str {
        match self {
            Self::HourMinute => "%H:%M",
            Self::HourMinuteSecond => "%H:%M:%S",
        }
    }
}

/// The zone the tracker reports in and the zone entities are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZones {
    pub source: Tz,
    pub local: Tz,
}

impl Default for TimeZones {
    fn default() -> Self {
        Self {
            source: Tz::UTC,
            local: chrono_tz::Europe::Stockholm,
        }
    }
}

impl TimeZones {
    /// Today's calendar date as seen from the source time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        now().with_timezone(&self.source).date_naive()
    }

    /// Convert a bare `HH:MM[:SS]` string observed on `date` from the source
    /// zone into the local zone.
    ///
    /// An empty input yields an empty output without any parsing. The result
    /// depends only on `date` and `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Parse`] when `clock` is not a wall-clock time and
    /// [`ClockError::Nonexistent`] when it falls in a DST gap of the source
    /// zone.
    pub fn convert_clock(
        &self,
        date: NaiveDate,
        clock: &str,
        format: ClockFormat,
    ) -> Result<String, ClockError> {
        let clock = clock.trim();
        if clock.is_empty() {
            return Ok(String::new());
        }

        let naive = date.and_time(parse_clock(clock)?);
        let observed = self
            .source
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| ClockError::Nonexistent(clock.to_string()))?;

        Ok(observed
            .with_timezone(&self.local)
            .format(format.pattern())
            .to_string())
    }
}

fn parse_clock(clock: &str) -> Result<NaiveTime, ClockError> {
    NaiveTime::parse_from_str(clock, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .map_err(|_| ClockError::Parse(clock.to_string()))
}
