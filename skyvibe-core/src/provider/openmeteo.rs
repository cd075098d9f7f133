use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::Endpoints,
    error::{Result, WeatherError, truncate_body},
    geocode::Geocoder,
    model::{Condition, Coordinates, HourlyEntry, Location, Place, WeatherReading, WeatherReport},
};

use super::{ProviderId, WeatherProvider};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
weather_code,wind_speed_10m,visibility,uv_index,surface_pressure,wind_direction_10m";

const HOURLY_FIELDS: &str = "temperature_2m,weather_code";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Keyless provider: geocodes city names, then fetches current and hourly conditions.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    forecast_url: String,
    geocoder: Geocoder,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(endpoints: &Endpoints, http: Client) -> Self {
        Self {
            forecast_url: endpoints.forecast_url.clone(),
            geocoder: Geocoder::new(endpoints.geocoding_url.clone(), http.clone()),
            http,
        }
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Fetch conditions at `coordinates`. Without a pre-resolved `place` the name is
    /// looked up afterwards by reverse geocoding.
    #[instrument(skip(self, place))]
    pub async fn fetch_at(
        &self,
        coordinates: Coordinates,
        place: Option<Place>,
    ) -> Result<WeatherReport> {
        let reading = self.fetch_forecast(coordinates).await?;

        let place = match place {
            Some(place) => place,
            None => self.geocoder.reverse(coordinates).await?.unwrap_or_else(|| Place {
                name: coordinates.label(),
                country: String::new(),
                coordinates,
            }),
        };

        Ok(WeatherReport {
            provider: ProviderId::OpenMeteo,
            place,
            reading,
        })
    }

    pub async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<WeatherReading> {
        debug!(url = %self.forecast_url, "forecast request");

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Fetch(format!(
                "forecast request failed with status {status}: {}",
                truncate_body(&body)
            )));
        }

        let parsed: OmResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_reading())
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    weather_code: u16,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    visibility: Option<f64>,
    uv_index: Option<f64>,
    surface_pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<u16>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
    #[serde(default)]
    hourly: OmHourly,
}

impl OmHourly {
    /// Zip the parallel arrays by index, stopping at the shortest one.
    fn into_entries(self) -> Vec<HourlyEntry> {
        self.time
            .into_iter()
            .zip(self.temperature_2m)
            .zip(self.weather_code)
            .map(|((time, temperature_c), weather_code)| {
                let time = NaiveDateTime::parse_from_str(&time, TIME_FORMAT)
                    .inspect_err(|e| debug!(%time, error = %e, "unparseable hourly timestamp"))
                    .ok();
                HourlyEntry {
                    time,
                    temperature_c,
                    weather_code,
                }
            })
            .collect()
    }
}

impl OmResponse {
    fn into_reading(self) -> WeatherReading {
        let current = self.current;
        WeatherReading {
            temperature_c: current.temperature_2m,
            apparent_temperature_c: current.apparent_temperature,
            humidity_pct: current.relative_humidity_2m.map(|h| h.round().clamp(0.0, 100.0) as u8),
            wind_speed_kmh: current.wind_speed_10m,
            wind_direction_deg: current.wind_direction_10m,
            visibility_m: current.visibility,
            uv_index: current.uv_index,
            pressure_hpa: current.surface_pressure,
            condition: Condition::Wmo(current.weather_code),
            hourly: self.hourly.into_entries(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn get_weather(&self, location: &Location) -> Result<WeatherReport> {
        match location {
            Location::City(name) => {
                let place = self.geocoder.search(name).await?;
                self.fetch_at(place.coordinates, Some(place)).await
            }
            Location::Coordinates(coordinates) => self.fetch_at(*coordinates, None).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> OmResponse {
        serde_json::from_str(json).expect("valid fixture")
    }

    #[test]
    fn parses_current_and_hourly() {
        let reading = response(
            r#"{
                "current": {
                    "time": "2024-06-01T14:00",
                    "temperature_2m": 18.6,
                    "relative_humidity_2m": 64,
                    "apparent_temperature": 17.9,
                    "weather_code": 2,
                    "wind_speed_10m": 11.3,
                    "visibility": 24140.0,
                    "uv_index": 5.15,
                    "surface_pressure": 1009.8
                },
                "hourly": {
                    "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
                    "temperature_2m": [14.2, 13.9],
                    "weather_code": [1, 3]
                }
            }"#,
        )
        .into_reading();

        assert_eq!(reading.temperature_c, 18.6);
        assert_eq!(reading.humidity_pct, Some(64));
        assert_eq!(reading.wind_direction_deg, None);
        assert_eq!(reading.condition, Condition::Wmo(2));
        assert_eq!(reading.hourly.len(), 2);
        assert_eq!(reading.hourly[1].weather_code, Some(3));
        assert_eq!(
            reading.hourly[1].time.map(|t| t.to_string()).as_deref(),
            Some("2024-06-01 01:00:00")
        );
    }

    #[test]
    fn uneven_hourly_arrays_are_truncated() {
        let reading = response(
            r#"{
                "current": {"temperature_2m": 1.0, "weather_code": 71},
                "hourly": {
                    "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
                    "temperature_2m": [1.0, 0.5],
                    "weather_code": [71, 73, 75]
                }
            }"#,
        )
        .into_reading();

        assert_eq!(reading.hourly.len(), 2);
        assert_eq!(reading.uv_index, None);
    }

    #[test]
    fn null_hours_keep_their_slot() {
        let reading = response(
            r#"{
                "current": {"temperature_2m": 1.0, "weather_code": 0},
                "hourly": {
                    "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00",
                             "2024-01-01T03:00", "2024-01-01T04:00", "2024-01-01T05:00",
                             "garbage"],
                    "temperature_2m": [null, 1, 2, 3, 4, 5, 6],
                    "weather_code": [0, 0, 0, 0, 0, 0, null]
                }
            }"#,
        )
        .into_reading();

        assert_eq!(reading.hourly.len(), 7);
        assert_eq!(reading.hourly[0].temperature_c, None);
        assert_eq!(reading.hourly[6].time, None);
        assert_eq!(reading.hourly[6].weather_code, None);

        let hours: Vec<_> = crate::render::forecast_window(&reading.hourly)
            .iter()
            .map(|h| h.time.map(|t| t.format("%-H").to_string()))
            .collect();
        let expected: Vec<_> = ["1", "2", "3", "4", "5"].map(|h| Some(h.to_string())).to_vec();
        assert_eq!(hours, expected);
    }
}
