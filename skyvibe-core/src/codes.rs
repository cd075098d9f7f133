//! WMO weather code lookup and the small formatting helpers that hang off it.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Background category a condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sunny => "sunny",
            Category::Cloudy => "cloudy",
            Category::Rainy => "rainy",
            Category::Snowy => "snowy",
            Category::Stormy => "stormy",
        }
    }

    pub const fn all() -> &'static [Category] {
        &[
            Category::Sunny,
            Category::Cloudy,
            Category::Rainy,
            Category::Snowy,
            Category::Stormy,
        ]
    }

    /// Representative glyph, used when a provider gives no code of its own.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Sunny => "☀️",
            Category::Cloudy => "☁️",
            Category::Rainy => "🌧️",
            Category::Snowy => "🌨️",
            Category::Stormy => "⛈️",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display triple derived from a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherInfo {
    pub icon: &'static str,
    pub description: Cow<'static, str>,
    pub category: Category,
}

impl WeatherInfo {
    const fn fixed(icon: &'static str, description: &'static str, category: Category) -> Self {
        Self {
            icon,
            description: Cow::Borrowed(description),
            category,
        }
    }
}

use Category::{Cloudy, Rainy, Snowy, Stormy, Sunny};

static WEATHER_CODES: &[(u16, WeatherInfo)] = &[
    (0, WeatherInfo::fixed("☀️", "Clear sky", Sunny)),
    (1, WeatherInfo::fixed("🌤️", "Mainly clear", Sunny)),
    (2, WeatherInfo::fixed("⛅", "Partly cloudy", Cloudy)),
    (3, WeatherInfo::fixed("☁️", "Overcast", Cloudy)),
    (45, WeatherInfo::fixed("🌫️", "Foggy", Cloudy)),
    (48, WeatherInfo::fixed("🌫️", "Depositing rime fog", Cloudy)),
    (51, WeatherInfo::fixed("🌦️", "Light drizzle", Rainy)),
    (53, WeatherInfo::fixed("🌦️", "Moderate drizzle", Rainy)),
    (55, WeatherInfo::fixed("🌧️", "Dense drizzle", Rainy)),
    (56, WeatherInfo::fixed("🌨️", "Light freezing drizzle", Snowy)),
    (57, WeatherInfo::fixed("🌨️", "Dense freezing drizzle", Snowy)),
    (61, WeatherInfo::fixed("🌧️", "Slight rain", Rainy)),
    (63, WeatherInfo::fixed("🌧️", "Moderate rain", Rainy)),
    (65, WeatherInfo::fixed("🌧️", "Heavy rain", Rainy)),
    (66, WeatherInfo::fixed("🌨️", "Light freezing rain", Snowy)),
    (67, WeatherInfo::fixed("🌨️", "Heavy freezing rain", Snowy)),
    (71, WeatherInfo::fixed("🌨️", "Slight snow", Snowy)),
    (73, WeatherInfo::fixed("🌨️", "Moderate snow", Snowy)),
    (75, WeatherInfo::fixed("❄️", "Heavy snow", Snowy)),
    (77, WeatherInfo::fixed("🌨️", "Snow grains", Snowy)),
    (80, WeatherInfo::fixed("🌦️", "Slight rain showers", Rainy)),
    (81, WeatherInfo::fixed("🌧️", "Moderate rain showers", Rainy)),
    (82, WeatherInfo::fixed("🌧️", "Violent rain showers", Rainy)),
    (85, WeatherInfo::fixed("🌨️", "Slight snow showers", Snowy)),
    (86, WeatherInfo::fixed("❄️", "Heavy snow showers", Snowy)),
    (95, WeatherInfo::fixed("⛈️", "Thunderstorm", Stormy)),
    (96, WeatherInfo::fixed("⛈️", "Thunderstorm with slight hail", Stormy)),
    (99, WeatherInfo::fixed("⛈️", "Thunderstorm with heavy hail", Stormy)),
];

static UNKNOWN: WeatherInfo = WeatherInfo::fixed("🌤️", "Unknown", Cloudy);

/// The fallback returned for codes outside the table, or when no code was reported.
pub fn unknown_info() -> WeatherInfo {
    UNKNOWN.clone()
}

/// Look up a WMO weather code. Codes outside the table map to the "Unknown" fallback.
pub fn weather_info(code: u16) -> WeatherInfo {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, info)| info)
        .unwrap_or(&UNKNOWN)
        .clone()
}

/// Category for an OpenWeather condition group (`weather[0].main`).
pub fn category_for_group(group: &str) -> Category {
    match group.to_ascii_lowercase().as_str() {
        "clear" => Sunny,
        "rain" | "drizzle" => Rainy,
        "snow" => Snowy,
        "thunderstorm" | "squall" | "tornado" => Stormy,
        _ => Cloudy,
    }
}

/// Qualitative UV index band.
pub fn uv_description(uv_index: f64) -> &'static str {
    if uv_index <= 2.0 {
        "Low"
    } else if uv_index <= 5.0 {
        "Moderate"
    } else if uv_index <= 7.0 {
        "High"
    } else if uv_index <= 10.0 {
        "Very High"
    } else {
        "Extreme"
    }
}

const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// Rounded pressure in hPa with an arrow relative to standard sea-level pressure.
pub fn format_pressure_trend(pressure_hpa: f64) -> String {
    let trend = if pressure_hpa > STANDARD_PRESSURE_HPA {
        '↑'
    } else if pressure_hpa < STANDARD_PRESSURE_HPA {
        '↓'
    } else {
        '→'
    };
    format!("{} hPa {trend}", crate::render::round_half_up(pressure_hpa))
}

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % COMPASS.len();
    COMPASS[index]
}
