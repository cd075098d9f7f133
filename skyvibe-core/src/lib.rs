//! Core library for the `skyvibe` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather providers (Open-Meteo, OpenWeather) and Open-Meteo geocoding
//! - The WMO code table and display formatting
//! - Application display state for a submit → fetch → render cycle
//!
//! It is used by `skyvibe-cli`, but can also be reused by other front ends.

pub mod app;
pub mod codes;
pub mod config;
pub mod error;
pub mod geocode;
pub mod model;
pub mod provider;
pub mod render;

pub use app::{App, DisplayState, RequestTicket};
pub use codes::{Category, WeatherInfo, weather_info};
pub use config::{Config, Endpoints, ProviderConfig};
pub use error::WeatherError;
pub use geocode::Geocoder;
pub use model::{Coordinates, HourlyEntry, Location, Place, WeatherReading, WeatherReport};
pub use provider::{ProviderId, WeatherProvider};
pub use render::{Surface, Theme, View};
