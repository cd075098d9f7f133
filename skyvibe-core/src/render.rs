//! Turning a report into text, and the presentational state around it
//! (background category, theme palette, timed error banner).

use std::time::{Duration, Instant};

use crossterm::style::{Color, Stylize};

use crate::{
    codes::{self, Category},
    model::{HourlyEntry, WeatherReport},
    provider::ProviderId,
};

/// First hourly index shown; index 0 is the current hour.
pub const FORECAST_START: usize = 1;
pub const FORECAST_LEN: usize = 5;

/// How long an error banner stays visible.
pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(5);

/// The forecast strip: up to five entries starting after the current hour.
pub fn forecast_window(hourly: &[HourlyEntry]) -> &[HourlyEntry] {
    let end = hourly.len().min(FORECAST_START + FORECAST_LEN);
    hourly.get(FORECAST_START..end).unwrap_or(&[])
}

/// Rounds halves towards positive infinity, so 18.5 → 19 and -2.5 → -2.
pub fn round_half_up(value: f64) -> i64 {
    let rounded = value.round();
    if value - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCell {
    pub time: String,
    pub icon: &'static str,
    pub temperature: String,
    pub description: String,
}

/// Every displayed field, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub icon: &'static str,
    pub temperature: String,
    pub description: String,
    pub feels_like: Option<String>,
    pub humidity: Option<String>,
    pub wind: Option<String>,
    pub visibility: Option<String>,
    pub uv: Option<String>,
    pub pressure: Option<String>,
    pub forecast: Vec<ForecastCell>,
    pub category: Category,
}

impl View {
    pub fn from_report(report: &WeatherReport) -> Self {
        let reading = &report.reading;
        let info = report.info();

        let temperature = match report.provider {
            ProviderId::OpenWeather => format!("{}°C", reading.temperature_c),
            ProviderId::OpenMeteo => format!("{}°", round_half_up(reading.temperature_c)),
        };

        let wind = reading.wind_speed_kmh.map(|speed| {
            let speed = format!("{} km/h", round_half_up(speed));
            match reading.wind_direction_deg {
                Some(deg) => format!("{speed} {}", codes::wind_direction(deg)),
                None => speed,
            }
        });

        let uv = match report.provider {
            ProviderId::OpenMeteo => Some(match reading.uv_index {
                Some(uv) => format!("{uv} ({})", codes::uv_description(uv)),
                None => "N/A".to_string(),
            }),
            ProviderId::OpenWeather => None,
        };

        let forecast = forecast_window(&reading.hourly)
            .iter()
            .map(|entry| {
                let info = entry
                    .weather_code
                    .map_or_else(codes::unknown_info, codes::weather_info);
                ForecastCell {
                    time: entry
                        .time
                        .map_or_else(|| "--:00".to_string(), |t| t.format("%-H:00").to_string()),
                    icon: info.icon,
                    temperature: entry
                        .temperature_c
                        .map_or_else(|| "--°".to_string(), |t| format!("{}°", round_half_up(t))),
                    description: info.description.into_owned(),
                }
            })
            .collect();

        View {
            title: report.place.display_name(),
            icon: info.icon,
            temperature,
            description: info.description.into_owned(),
            feels_like: reading
                .apparent_temperature_c
                .map(|t| format!("{}°C", round_half_up(t))),
            humidity: reading.humidity_pct.map(|h| format!("{h}%")),
            wind,
            visibility: reading
                .visibility_m
                .map(|m| format!("{} km", round_half_up(m / 1000.0))),
            uv,
            pressure: reading.pressure_hpa.map(codes::format_pressure_trend),
            forecast,
            category: info.category,
        }
    }
}

/// Gradient palette cycled by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Default,
    Ocean,
    Sunset,
    Forest,
    Cosmic,
}

impl Theme {
    pub const fn all() -> &'static [Theme] {
        &[
            Theme::Default,
            Theme::Ocean,
            Theme::Sunset,
            Theme::Forest,
            Theme::Cosmic,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Ocean => "ocean",
            Theme::Sunset => "sunset",
            Theme::Forest => "forest",
            Theme::Cosmic => "cosmic",
        }
    }

    /// Start and end colour of the gradient.
    pub fn gradient(&self) -> [Color; 2] {
        match self {
            Theme::Default => [rgb(0x66, 0x7e, 0xea), rgb(0x76, 0x4b, 0xa2)],
            Theme::Ocean => [rgb(0x2e, 0x31, 0x92), rgb(0x1b, 0xff, 0xff)],
            Theme::Sunset => [rgb(0xff, 0x9a, 0x9e), rgb(0xfe, 0xcf, 0xef)],
            Theme::Forest => [rgb(0x13, 0x4e, 0x5e), rgb(0x71, 0xb2, 0x80)],
            Theme::Cosmic => [rgb(0x4c, 0x11, 0x30), rgb(0x8e, 0x4b, 0x92)],
        }
    }

    pub fn next(self) -> Theme {
        let all = Theme::all();
        let idx = all.iter().position(|t| *t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// Overlay tint for a background category; `None` means transparent.
pub fn overlay(category: Option<Category>) -> Option<Color> {
    match category? {
        Category::Sunny => Some(rgb(255, 255, 0)),
        Category::Cloudy => Some(rgb(200, 200, 200)),
        Category::Rainy => Some(rgb(0, 100, 255)),
        Category::Snowy => Some(rgb(255, 255, 255)),
        Category::Stormy => Some(rgb(255, 200, 0)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ErrorBanner {
    message: String,
    shown_at: Instant,
}

/// Presentational state owned by whoever draws to the terminal.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    background: Option<Category>,
    theme: Theme,
    banner: Option<ErrorBanner>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the background category. Applying the same one again changes nothing.
    pub fn set_background(&mut self, category: Category) {
        self.background = Some(category);
    }

    pub fn background(&self) -> Option<Category> {
        self.background
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn cycle_theme(&mut self) -> Theme {
        self.theme = self.theme.next();
        self.theme
    }

    pub fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        self.banner = Some(ErrorBanner {
            message: message.into(),
            shown_at: now,
        });
    }

    /// The banner message, if it was shown less than [`ERROR_BANNER_TTL`] before `now`.
    pub fn visible_error(&self, now: Instant) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|b| now.saturating_duration_since(b.shown_at) < ERROR_BANNER_TTL)
            .map(|b| b.message.as_str())
    }

    /// Render `view` as terminal text. With `color` off, no escape codes are emitted.
    pub fn render(&self, view: &View, color: bool) -> String {
        let [start, end] = self.theme.gradient();
        let tint = overlay(self.background);
        let paint = |fg: Option<Color>, text: &str| match fg {
            Some(fg) if color => text.with(fg).to_string(),
            _ => text.to_string(),
        };

        let mut lines = vec![
            paint(Some(start), &format!("{}  {}", view.icon, view.title)),
            format!("   {}  {}", paint(tint, &view.temperature), view.description),
        ];

        let details: Vec<String> = [
            ("Feels like", &view.feels_like),
            ("Humidity", &view.humidity),
            ("Wind", &view.wind),
            ("Visibility", &view.visibility),
            ("UV", &view.uv),
            ("Pressure", &view.pressure),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label} {v}")))
        .collect();

        lines.extend(details.chunks(3).map(|chunk| format!("   {}", chunk.join(" · "))));

        if !view.forecast.is_empty() {
            let strip: Vec<String> = view
                .forecast
                .iter()
                .map(|c| format!("{} {} {}", c.time, c.icon, c.temperature))
                .collect();
            lines.push(format!("   {}", paint(Some(end), &strip.join("   "))));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, Coordinates, Place, WeatherReading};
    use chrono::NaiveDate;

    fn hours(n: usize) -> Vec<HourlyEntry> {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        (0..n)
            .map(|h| HourlyEntry {
                time: day.and_hms_opt(h as u32, 0, 0),
                temperature_c: Some(10.0 + h as f64),
                weather_code: Some(if h % 2 == 0 { 0 } else { 61 }),
            })
            .collect()
    }

    fn report(provider: ProviderId, temp: f64, condition: Condition) -> WeatherReport {
        WeatherReport {
            provider,
            place: Place {
                name: "Paris".into(),
                country: "France".into(),
                coordinates: Coordinates::new(48.85, 2.35),
            },
            reading: WeatherReading {
                temperature_c: temp,
                apparent_temperature_c: Some(17.4),
                humidity_pct: Some(64),
                wind_speed_kmh: Some(11.3),
                wind_direction_deg: Some(225.0),
                visibility_m: Some(24_140.0),
                uv_index: None,
                pressure_hpa: Some(1009.8),
                condition,
                hourly: hours(24),
            },
        }
    }

    #[test]
    fn forecast_window_skips_current_hour() {
        let all = hours(24);
        let window = forecast_window(&all);
        assert_eq!(window.len(), 5);
        assert_eq!(window, &all[1..6]);
        assert!(window.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn forecast_window_handles_short_series() {
        assert!(forecast_window(&[]).is_empty());
        assert!(forecast_window(&hours(1)).is_empty());
        assert_eq!(forecast_window(&hours(3)).len(), 2);
        assert_eq!(forecast_window(&hours(6)).len(), 5);
    }

    #[test]
    fn half_up_rounding() {
        assert_eq!(round_half_up(18.5), 19);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-0.4), 0);
        assert_eq!(round_half_up(0.49999999999999994), 0);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(2.5), 3);
    }

    #[test]
    fn gaps_in_the_series_keep_their_position() {
        let mut series = hours(7);
        series[0].temperature_c = None;
        series[2].weather_code = None;
        series[3].time = None;

        let window = forecast_window(&series);
        assert_eq!(window, &series[1..6]);

        let mut r = report(ProviderId::OpenMeteo, 5.0, Condition::Wmo(3));
        r.reading.hourly = series;
        let view = View::from_report(&r);

        let times: Vec<_> = view.forecast.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, ["1:00", "2:00", "--:00", "4:00", "5:00"]);
        assert_eq!(view.forecast[1].description, "Unknown");
        assert_eq!(view.forecast[1].temperature, "12°");

        r.reading.hourly[1].temperature_c = None;
        let view = View::from_report(&r);
        assert_eq!(view.forecast[0].temperature, "--°");
    }

    #[test]
    fn open_meteo_view_rounds_and_formats() {
        let view = View::from_report(&report(ProviderId::OpenMeteo, 18.5, Condition::Wmo(0)));

        assert_eq!(view.title, "Paris, France");
        assert_eq!(view.temperature, "19°");
        assert_eq!(view.category, Category::Sunny);
        assert_eq!(view.feels_like.as_deref(), Some("17°C"));
        assert_eq!(view.humidity.as_deref(), Some("64%"));
        assert_eq!(view.wind.as_deref(), Some("11 km/h SW"));
        assert_eq!(view.visibility.as_deref(), Some("24 km"));
        assert_eq!(view.uv.as_deref(), Some("N/A"));
        assert_eq!(view.pressure.as_deref(), Some("1010 hPa ↓"));

        let times: Vec<_> = view.forecast.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, ["1:00", "2:00", "3:00", "4:00", "5:00"]);
        assert_eq!(view.forecast[0].icon, "🌧️");
        assert_eq!(view.forecast[0].temperature, "11°");
    }

    #[test]
    fn open_weather_view_keeps_raw_temperature() {
        let view = View::from_report(&report(
            ProviderId::OpenWeather,
            18.5,
            Condition::Group {
                group: "Clear".into(),
                description: "clear sky".into(),
            },
        ));

        assert_eq!(view.temperature, "18.5°C");
        assert_eq!(view.description, "clear sky");
        assert_eq!(view.category, Category::Sunny);
        assert_eq!(view.uv, None);
    }

    #[test]
    fn background_switching_is_idempotent() {
        let mut once = Surface::new();
        once.set_background(Category::Rainy);

        let mut twice = Surface::new();
        twice.set_background(Category::Rainy);
        twice.set_background(Category::Rainy);

        let view = View::from_report(&report(ProviderId::OpenMeteo, 12.0, Condition::Wmo(61)));
        assert_eq!(once.background(), twice.background());
        assert_eq!(once.render(&view, true), twice.render(&view, true));
    }

    #[test]
    fn overlay_defaults_to_transparent() {
        assert_eq!(overlay(None), None);
        for c in Category::all() {
            assert!(overlay(Some(*c)).is_some());
        }
    }

    #[test]
    fn theme_cycle_wraps_after_five() {
        let mut surface = Surface::new();
        let seen: Vec<_> = (0..5).map(|_| surface.cycle_theme()).collect();
        assert_eq!(
            seen,
            [Theme::Ocean, Theme::Sunset, Theme::Forest, Theme::Cosmic, Theme::Default]
        );
    }

    #[test]
    fn error_banner_hides_after_five_seconds() {
        let mut surface = Surface::new();
        let t0 = Instant::now();
        surface.show_error("City not found", t0);

        assert_eq!(surface.visible_error(t0), Some("City not found"));
        assert_eq!(surface.visible_error(t0 + Duration::from_millis(4_999)), Some("City not found"));
        assert_eq!(surface.visible_error(t0 + ERROR_BANNER_TTL), None);
    }

    #[test]
    fn plain_render_has_no_escape_codes() {
        let surface = Surface::new();
        let view = View::from_report(&report(ProviderId::OpenMeteo, 18.5, Condition::Wmo(95)));
        let text = surface.render(&view, false);

        assert!(!text.contains('\x1b'));
        assert!(text.contains("⛈️  Paris, France"));
        assert!(text.contains("19°  Thunderstorm"));
        assert!(text.contains("1:00 🌧️ 11°"));
    }
}
