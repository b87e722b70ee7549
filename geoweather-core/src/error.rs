use thiserror::Error;

/// Sub-kind of a non-success HTTP status, used for logging and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    BadRequest,
    NotFound,
    Other,
}

impl ClientErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ClientErrorKind::BadRequest,
            404 => ClientErrorKind::NotFound,
            _ => ClientErrorKind::Other,
        }
    }
}

/// Everything that can end a single weather trigger.
///
/// None of these are fatal to the process: the caller reports the
/// [`user_message`](WeatherError::user_message) and may trigger again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("location services are disabled")]
    LocationDisabled,

    #[error("location permission denied")]
    LocationPermissionDenied,

    #[error("no active network connection")]
    NoConnectivity,

    /// The service answered with a non-success status.
    #[error("weather request failed with status {status}")]
    Client { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse weather response: {0}")]
    Parse(String),

    #[error("invalid weather query: {0}")]
    InvalidQuery(String),
}

impl WeatherError {
    /// Sub-kind for [`WeatherError::Client`], `None` for every other variant.
    pub fn client_kind(&self) -> Option<ClientErrorKind> {
        match self {
            WeatherError::Client { status } => Some(ClientErrorKind::from_status(*status)),
            _ => None,
        }
    }

    /// True when the user can fix the cause (e.g. by enabling location).
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            WeatherError::LocationDisabled
                | WeatherError::LocationPermissionDenied
                | WeatherError::NoConnectivity
                | WeatherError::InvalidQuery(_)
        )
    }

    /// Short message for the presentation layer. Raw status codes are never
    /// surfaced here.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationDisabled => {
                "Your location provider is turned off. Please turn it on."
            }
            WeatherError::LocationPermissionDenied => {
                "Location permission was denied. Please enable it, it is mandatory for the app to work."
            }
            WeatherError::NoConnectivity => "No internet connection available.",
            WeatherError::Client { status } => match ClientErrorKind::from_status(*status) {
                ClientErrorKind::BadRequest => "The weather service rejected the request.",
                ClientErrorKind::NotFound => "No weather data found for this location.",
                ClientErrorKind::Other => "Weather request failed.",
            },
            WeatherError::Network(_) => "Could not reach the weather service.",
            WeatherError::Parse(_) => "The weather service sent an unexpected response.",
            WeatherError::InvalidQuery(_) => "Invalid location or missing API key.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_kind_distinguishes_bad_request_and_not_found() {
        assert_eq!(ClientErrorKind::from_status(400), ClientErrorKind::BadRequest);
        assert_eq!(ClientErrorKind::from_status(404), ClientErrorKind::NotFound);
        assert_eq!(ClientErrorKind::from_status(401), ClientErrorKind::Other);
        assert_eq!(ClientErrorKind::from_status(503), ClientErrorKind::Other);

        assert_eq!(
            WeatherError::Client { status: 404 }.client_kind(),
            Some(ClientErrorKind::NotFound)
        );
        assert_eq!(WeatherError::NoConnectivity.client_kind(), None);
    }

    #[test]
    fn every_kind_has_a_distinct_message() {
        let errors = [
            WeatherError::LocationDisabled,
            WeatherError::LocationPermissionDenied,
            WeatherError::NoConnectivity,
            WeatherError::Client { status: 400 },
            WeatherError::Client { status: 404 },
            WeatherError::Client { status: 500 },
            WeatherError::Network("refused".into()),
            WeatherError::Parse("eof".into()),
            WeatherError::InvalidQuery("empty key".into()),
        ];

        let mut messages: Vec<&str> = errors.iter().map(|e| e.user_message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn unknown_status_collapses_to_generic_message() {
        let a = WeatherError::Client { status: 418 }.user_message();
        let b = WeatherError::Client { status: 502 }.user_message();
        assert_eq!(a, b);
        assert!(!a.contains("418"));
        assert!(!b.contains("502"));
    }

    #[test]
    fn location_errors_are_user_actionable() {
        assert!(WeatherError::LocationDisabled.is_user_actionable());
        assert!(WeatherError::LocationPermissionDenied.is_user_actionable());
        assert!(!WeatherError::Client { status: 404 }.is_user_actionable());
        assert!(!WeatherError::Parse("x".into()).is_user_actionable());
    }
}
