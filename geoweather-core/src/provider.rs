use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{
    Config, WeatherError,
    model::{WeatherQuery, WeatherReport},
    provider::openweather::OpenWeatherClient,
};

pub mod openweather;

/// Performs exactly one outbound request per call; no retries, no caching.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError>;
}

/// Construct the OpenWeather client described by the config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherClient>> {
    let client = OpenWeatherClient::new(
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
    )?;

    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let cfg = Config::default();
        assert!(client_from_config(&cfg).is_ok());
    }
}
