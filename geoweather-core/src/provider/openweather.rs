use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{ClientErrorKind, WeatherError},
    model::{WeatherQuery, WeatherReport},
};

use super::WeatherClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/";
const CURRENT_WEATHER_PATH: &str = "2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { base_url, http })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_WEATHER_PATH)
    }

    #[instrument(
        skip(self, query),
        fields(
            lat = query.coordinate.latitude,
            lon = query.coordinate.longitude,
            units = %query.unit_system,
        )
    )]
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        query.validate()?;

        let lat = query.coordinate.latitude.to_string();
        let lon = query.coordinate.longitude.to_string();

        let res = self
            .http
            .get(self.endpoint())
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", query.unit_system.as_str()),
                ("appid", query.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                let cause = describe_transport_error(&e);
                warn!("OpenWeather request failed: {cause}");
                WeatherError::Network(cause)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            let cause = describe_transport_error(&e);
            warn!("Failed to read OpenWeather response body: {cause}");
            WeatherError::Network(cause)
        })?;

        if !status.is_success() {
            let code = status.as_u16();
            match ClientErrorKind::from_status(code) {
                ClientErrorKind::BadRequest => {
                    warn!(status = code, "OpenWeather: bad request: {}", truncate_body(&body))
                }
                ClientErrorKind::NotFound => {
                    warn!(status = code, "OpenWeather: not found: {}", truncate_body(&body))
                }
                ClientErrorKind::Other => {
                    warn!(status = code, "OpenWeather request failed: {}", truncate_body(&body))
                }
            }
            return Err(WeatherError::Client { status: code });
        }

        let report = parse_report(&body)?;
        info!(
            location = %report.location_name,
            country = %report.country_code,
            temperature = report.temperature,
            "fetched current weather"
        );

        Ok(report)
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    name: String,
    sys: OwSys,
}

/// Map a `2.5/weather` body onto a [`WeatherReport`].
///
/// When several conditions are listed the last one is reported, the same
/// entry a screen that renders them in order would end up showing.
pub fn parse_report(body: &str) -> Result<WeatherReport, WeatherError> {
    let mut parsed: OwCurrentResponse = serde_json::from_str(body).map_err(|e| {
        debug!("Unexpected OpenWeather body: {}", truncate_body(body));
        WeatherError::Parse(e.to_string())
    })?;

    let condition = parsed
        .weather
        .pop()
        .ok_or_else(|| WeatherError::Parse("response contained no weather conditions".into()))?;

    let report = WeatherReport {
        condition_main: condition.main,
        condition_description: condition.description,
        icon_code: condition.icon,
        temperature: parsed.main.temp,
        humidity: parsed.main.humidity,
        temp_min: parsed.main.temp_min,
        temp_max: parsed.main.temp_max,
        wind_speed: parsed.wind.speed,
        location_name: parsed.name,
        country_code: parsed.sys.country,
        sunrise_unix_seconds: parsed.sys.sunrise,
        sunset_unix_seconds: parsed.sys.sunset,
    };
    report.validate()?;

    Ok(report)
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        self.fetch_current(query).await
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
