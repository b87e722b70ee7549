use serde::{Deserialize, Serialize};

/// Icon shown for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconId {
    Sunny,
    Cloud,
    Rain,
    Storm,
    Snowflake,
    Unknown,
}

impl IconId {
    pub fn name(&self) -> &'static str {
        match self {
            IconId::Sunny => "sunny",
            IconId::Cloud => "cloud",
            IconId::Rain => "rain",
            IconId::Storm => "storm",
            IconId::Snowflake => "snowflake",
            IconId::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// OpenWeather icon codes (`d` = day, `n` = night) we have artwork for.
const ICON_TABLE: &[(&str, IconId)] = &[
    ("01d", IconId::Sunny),
    ("02d", IconId::Cloud),
    ("03d", IconId::Cloud),
    ("04d", IconId::Cloud),
    ("10d", IconId::Rain),
    ("11d", IconId::Storm),
    ("13d", IconId::Snowflake),
    ("01n", IconId::Cloud),
    ("02n", IconId::Cloud),
    ("03n", IconId::Cloud),
    ("04n", IconId::Cloud),
    ("10n", IconId::Cloud),
    ("11n", IconId::Rain),
    ("13n", IconId::Snowflake),
];

/// Look up the icon for a condition code; unknown codes map to
/// [`IconId::Unknown`].
pub fn icon_for(code: &str) -> IconId {
    ICON_TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, icon)| *icon)
        .unwrap_or(IconId::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_codes() {
        assert_eq!(icon_for("01d"), IconId::Sunny);
        assert_eq!(icon_for("02d"), IconId::Cloud);
        assert_eq!(icon_for("04d"), IconId::Cloud);
        assert_eq!(icon_for("10d"), IconId::Rain);
        assert_eq!(icon_for("11d"), IconId::Storm);
        assert_eq!(icon_for("13d"), IconId::Snowflake);
    }

    #[test]
    fn night_codes() {
        assert_eq!(icon_for("01n"), IconId::Cloud);
        assert_eq!(icon_for("10n"), IconId::Cloud);
        assert_eq!(icon_for("11n"), IconId::Rain);
        assert_eq!(icon_for("13n"), IconId::Snowflake);
    }

    #[test]
    fn unknown_codes_fall_back() {
        for code in ["", "50d", "09n", "01D", "garbage", "01d "] {
            assert_eq!(icon_for(code), IconId::Unknown, "{code:?}");
        }
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let mut codes: Vec<&str> = ICON_TABLE.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ICON_TABLE.len());
    }

    #[test]
    fn icon_names() {
        assert_eq!(IconId::Snowflake.name(), "snowflake");
        assert_eq!(IconId::Unknown.to_string(), "unknown");
    }
}
