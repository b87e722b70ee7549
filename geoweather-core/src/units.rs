//! Temperature unit selection by region.

pub const CELSIUS: &str = "°C";
pub const FAHRENHEIT: &str = "°F";

/// Regions that report temperature in Fahrenheit.
const FAHRENHEIT_REGIONS: &[&str] = &["US", "LR", "MM"];

/// Temperature suffix for an ISO 3166 region code.
///
/// Matching is exact: lowercase or unknown codes fall back to Celsius.
pub fn suffix_for(region_code: &str) -> &'static str {
    if FAHRENHEIT_REGIONS.contains(&region_code) {
        FAHRENHEIT
    } else {
        CELSIUS
    }
}

/// Extract the territory from a POSIX locale such as `en_US.UTF-8` or
/// `sr_RS@latin`.
pub fn region_from_locale(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next().unwrap_or_default();
    let (_, territory) = base.split_once(['_', '-'])?;

    if territory.is_empty() {
        None
    } else {
        Some(territory.to_string())
    }
}
