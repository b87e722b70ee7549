use chrono::{DateTime, Local, TimeZone, Utc};
use geoweather_core::{UnitSystem, WeatherError, WeatherReport};
use std::fmt::Display;

/// Multi-line summary of a report, times in the local timezone.
pub fn report(report: &WeatherReport, units: UnitSystem) -> String {
    report_in(report, units, &Local)
}

pub fn report_in<Tz>(report: &WeatherReport, units: UnitSystem, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let suffix = units.temperature_suffix();
    let speed = match units {
        UnitSystem::Metric => "m/s",
        UnitSystem::Imperial => "mph",
    };

    [
        format!(
            "{} ({})  [{}]",
            report.condition_main,
            report.condition_description,
            report.icon()
        ),
        format!("Temperature: {}{suffix}", report.temperature),
        format!("  {}{suffix} min / {}{suffix} max", report.temp_min, report.temp_max),
        format!("Humidity: {} per cent", report.humidity),
        format!("Wind: {} {speed}", report.wind_speed),
        format!("Location: {}, {}", report.location_name, report.country_code),
        format!(
            "Sunrise: {}  Sunset: {}",
            clock(report.sunrise(), tz),
            clock(report.sunset(), tz)
        ),
    ]
    .join("\n")
}

/// User-facing text for a failed run, with a hint where the fix is ours to suggest.
pub fn failure(err: &WeatherError) -> String {
    let hint = match err {
        WeatherError::LocationDisabled => {
            Some("Hint: pass --lat/--lon or store a location with `geoweather configure`.")
        }
        WeatherError::InvalidQuery(_) => {
            Some("Hint: check the coordinates and run `geoweather configure` to set an API key.")
        }
        WeatherError::NoConnectivity => Some("Hint: use --assume-online to skip this check."),
        _ => None,
    };

    match hint {
        Some(hint) => format!("{}\n{hint}", err.user_message()),
        None => err.user_message().to_string(),
    }
}

fn clock<Tz>(time: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.map(|t| t.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
