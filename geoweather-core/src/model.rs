use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::WeatherError,
    icon::{IconId, icon_for},
    units::{FAHRENHEIT, suffix_for},
};

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        let coordinate = Self { latitude, longitude };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Unit system customary in a region, so that fetched values match the
    /// suffix [`suffix_for`] picks for it.
    pub fn for_region(region_code: &str) -> Self {
        if suffix_for(region_code) == FAHRENHEIT {
            UnitSystem::Imperial
        } else {
            UnitSystem::Metric
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => crate::units::CELSIUS,
            UnitSystem::Imperial => FAHRENHEIT,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// One outbound request: where, in which units, with which key.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    pub coordinate: Coordinate,
    pub unit_system: UnitSystem,
    pub api_key: String,
}

impl WeatherQuery {
    pub fn new(coordinate: Coordinate, unit_system: UnitSystem, api_key: impl Into<String>) -> Self {
        Self { coordinate, unit_system, api_key: api_key.into() }
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        self.coordinate.validate()?;
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::InvalidQuery("API key is empty".to_string()));
        }
        Ok(())
    }
}

/// Current conditions at a location, as returned by the weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub condition_main: String,
    pub condition_description: String,
    pub icon_code: String,
    pub temperature: f64,
    pub humidity: u8,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
    pub location_name: String,
    pub country_code: String,
    pub sunrise_unix_seconds: i64,
    pub sunset_unix_seconds: i64,
}

impl WeatherReport {
    /// Check humidity is a percentage and sunrise does not come after sunset.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.humidity > 100 {
            return Err(WeatherError::Parse(format!(
                "humidity {} is outside [0, 100]",
                self.humidity
            )));
        }
        if self.sunrise_unix_seconds > self.sunset_unix_seconds {
            return Err(WeatherError::Parse(format!(
                "sunrise {} is after sunset {}",
                self.sunrise_unix_seconds, self.sunset_unix_seconds
            )));
        }
        Ok(())
    }

    pub fn icon(&self) -> IconId {
        icon_for(&self.icon_code)
    }

    pub fn sunrise(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sunrise_unix_seconds, 0)
    }

    pub fn sunset(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sunset_unix_seconds, 0)
    }
}
