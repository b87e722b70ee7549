use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::WeatherError, model::Coordinate};

/// Source of the device's current position.
///
/// Each call answers at most once. Implementations fail with
/// [`WeatherError::LocationDisabled`] when location services are off and
/// [`WeatherError::LocationPermissionDenied`] when access was refused.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_once(&self) -> Result<Coordinate, WeatherError>;
}

/// A position supplied up front, from arguments or configuration.
///
/// No position means there is nothing to locate with, which is reported the
/// same way as disabled location services.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    coordinate: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_once(&self) -> Result<Coordinate, WeatherError> {
        let coordinate = self.coordinate.ok_or(WeatherError::LocationDisabled)?;
        coordinate.validate()?;
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_location_returns_coordinate() {
        let coord = Coordinate::new(34.7854, 33.456).unwrap();
        let provider = FixedLocation::new(Some(coord));
        assert_eq!(provider.request_once().await.unwrap(), coord);
    }

    #[tokio::test]
    async fn missing_coordinate_means_disabled() {
        let provider = FixedLocation::default();
        assert_eq!(provider.request_once().await.unwrap_err(), WeatherError::LocationDisabled);
    }

    #[tokio::test]
    async fn invalid_coordinate_is_rejected() {
        let provider = FixedLocation::new(Some(Coordinate { latitude: 123.0, longitude: 0.0 }));
        assert!(matches!(
            provider.request_once().await.unwrap_err(),
            WeatherError::InvalidQuery(_)
        ));
    }
}
