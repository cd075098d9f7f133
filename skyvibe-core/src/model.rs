use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    codes::{self, WeatherInfo},
    provider::ProviderId,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Short label used when no place name could be resolved.
    pub fn label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates(Coordinates),
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

impl Place {
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Provider-specific description of the current condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// WMO weather code (Open-Meteo).
    Wmo(u16),
    /// Condition group and free-text description (OpenWeather).
    Group { group: String, description: String },
}

impl Condition {
    pub fn info(&self) -> WeatherInfo {
        match self {
            Condition::Wmo(code) => codes::weather_info(*code),
            Condition::Group { group, description } => {
                let category = codes::category_for_group(group);
                WeatherInfo {
                    icon: category.icon(),
                    description: description.clone().into(),
                    category,
                }
            }
        }
    }
}

/// One slot of the hourly series. Slots keep their position even when the
/// provider left a value out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: Option<NaiveDateTime>,
    pub temperature_c: Option<f64>,
    pub weather_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub apparent_temperature_c: Option<f64>,
    pub humidity_pct: Option<u8>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub visibility_m: Option<f64>,
    pub uv_index: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub condition: Condition,
    /// Hourly series in time order; index 0 is the current hour.
    pub hourly: Vec<HourlyEntry>,
}

/// One complete fetch result. A new report replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: ProviderId,
    pub place: Place,
    pub reading: WeatherReading,
}

impl WeatherReport {
    pub fn info(&self) -> WeatherInfo {
        self.reading.condition.info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::Category;

    #[test]
    fn group_condition_keeps_provider_description() {
        let cond = Condition::Group {
            group: "Clear".into(),
            description: "clear sky".into(),
        };
        let info = cond.info();
        assert_eq!(info.description, "clear sky");
        assert_eq!(info.category, Category::Sunny);
    }

    #[test]
    fn place_display_name_omits_missing_country() {
        let mut place = Place {
            name: "Paris".into(),
            country: "France".into(),
            coordinates: Coordinates::new(48.85, 2.35),
        };
        assert_eq!(place.display_name(), "Paris, France");
        place.country.clear();
        assert_eq!(place.display_name(), "Paris");
    }
}
