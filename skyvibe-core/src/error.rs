use thiserror::Error;

/// Everything that can go wrong between a submitted location and a rendered report.
///
/// None of these are fatal: callers show the message and accept the next submission.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Please enter a city name")]
    EmptyInput,

    #[error("City not found: {0}")]
    LocationNotFound(String),

    #[error("Unable to fetch weather data: {0}")]
    Fetch(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Fetch(format!("malformed response: {err}"))
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Shortens a response body before it goes into an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(WeatherError::EmptyInput.to_string(), "Please enter a city name");
        assert_eq!(
            WeatherError::LocationNotFound("Atlantis".into()).to_string(),
            "City not found: Atlantis"
        );
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let short = truncate_body(&body);
        assert!(short.ends_with("..."));
        assert!(short.len() <= 203);
    }

    #[test]
    fn parse_failure_becomes_fetch_error() {
        let err: WeatherError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, WeatherError::Fetch(_)));
    }
}
