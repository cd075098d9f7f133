//! Open-Meteo geocoding: city name to coordinates, and the reverse.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError, truncate_body},
    model::{Coordinates, Place},
};

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl From<GeoResult> for Place {
    fn from(r: GeoResult) -> Self {
        Place {
            name: r.name,
            country: r.country.unwrap_or_default(),
            coordinates: Coordinates::new(r.latitude, r.longitude),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
    http: Client,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Resolve a city name to the first matching place.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Place> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::EmptyInput);
        }

        let parsed = self.lookup(&[("name", name.to_owned()), ("count", "1".into())]).await?;

        parsed
            .results
            .and_then(|r| r.into_iter().next())
            .map(Place::from)
            .ok_or_else(|| WeatherError::LocationNotFound(name.to_owned()))
    }

    /// Find a display name for coordinates. `Ok(None)` when nothing matched.
    #[instrument(skip(self))]
    pub async fn reverse(&self, coordinates: Coordinates) -> Result<Option<Place>> {
        let parsed = self
            .lookup(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("count", "1".into()),
            ])
            .await?;

        Ok(parsed.results.and_then(|r| r.into_iter().next()).map(Place::from))
    }

    async fn lookup(&self, query: &[(&str, String)]) -> Result<GeoResponse> {
        debug!(url = %self.base_url, "geocoding request");

        let res = self.http.get(&self.base_url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Fetch(format!(
                "geocoding request failed with status {status}: {}",
                truncate_body(&body)
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_request() {
        // Unroutable URL: reaching the network would produce a Fetch error instead.
        let geocoder = Geocoder::new("http://127.0.0.1:1/search", Client::new());
        let err = geocoder.search("   ").await.unwrap_err();
        assert!(matches!(err, WeatherError::EmptyInput));
    }

    #[test]
    fn missing_results_key_parses_as_none() {
        let parsed: GeoResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(parsed.results.is_none());
    }

    #[test]
    fn result_without_country_becomes_empty_string() {
        let parsed: GeoResponse = serde_json::from_str(
            r#"{"results":[{"name":"Null Island","latitude":0.0,"longitude":0.0}]}"#,
        )
        .unwrap();
        let place: Place = parsed.results.unwrap().into_iter().next().unwrap().into();
        assert_eq!(place.country, "");
        assert_eq!(place.display_name(), "Null Island");
    }
}
