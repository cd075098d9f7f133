use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError, truncate_body},
    model::{Condition, Coordinates, Location, Place, WeatherReading, WeatherReport},
};

use super::{ProviderId, WeatherProvider};

/// OpenWeather reports wind in m/s under metric units.
const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, url: impl Into<String>, http: Client) -> Self {
        Self {
            api_key,
            url: url.into(),
            http,
        }
    }

    #[instrument(skip(self, query))]
    async fn fetch_current(&self, query: Vec<(&str, String)>) -> Result<WeatherReport> {
        debug!(url = %self.url, "current weather request");

        let res = self
            .http
            .get(&self.url)
            .query(&query)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        // Failures still carry a JSON envelope with `cod` and `message`.
        let envelope: OwEnvelope = serde_json::from_str(&body).map_err(|_| {
            WeatherError::Fetch(format!(
                "OpenWeather request failed with status {status}: {}",
                truncate_body(&body)
            ))
        })?;

        match envelope.code() {
            Some(200) => {}
            Some(404) => {
                let wanted = query
                    .iter()
                    .find(|(k, _)| *k == "q")
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| "requested location".to_string());
                return Err(WeatherError::LocationNotFound(wanted));
            }
            other => {
                return Err(WeatherError::Fetch(format!(
                    "OpenWeather returned code {}: {}",
                    other.map_or_else(|| status.as_u16().to_string(), |c| c.to_string()),
                    envelope.message.unwrap_or_default()
                )));
            }
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_report())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<OwCode>,
    message: Option<String>,
}

impl OwEnvelope {
    fn code(&self) -> Option<i64> {
        match self.cod.as_ref()? {
            OwCode::Number(n) => Some(*n),
            OwCode::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: Option<u8>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: Option<OwCoord>,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    visibility: Option<f64>,
}

impl OwCurrentResponse {
    fn into_report(self) -> WeatherReport {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|w| Condition::Group {
                group: w.main,
                description: w.description,
            })
            .unwrap_or_else(|| Condition::Group {
                group: String::new(),
                description: "Unknown".to_string(),
            });

        let coordinates = self
            .coord
            .map(|c| Coordinates::new(c.lat, c.lon))
            .unwrap_or_else(|| Coordinates::new(0.0, 0.0));

        WeatherReport {
            provider: ProviderId::OpenWeather,
            place: Place {
                name: self.name,
                country: self.sys.country.unwrap_or_default(),
                coordinates,
            },
            reading: WeatherReading {
                temperature_c: self.main.temp,
                apparent_temperature_c: self.main.feels_like,
                humidity_pct: self.main.humidity,
                wind_speed_kmh: self.wind.speed.map(|s| s * MPS_TO_KMH),
                wind_direction_deg: self.wind.deg,
                visibility_m: self.visibility,
                uv_index: None,
                pressure_hpa: self.main.pressure,
                condition,
                hourly: Vec::new(),
            },
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn get_weather(&self, location: &Location) -> Result<WeatherReport> {
        let query = match location {
            Location::City(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(WeatherError::EmptyInput);
                }
                vec![("q", name.to_owned())]
            }
            Location::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };

        self.fetch_current(query).await
    }
}
