//! Submission flow and display state.

use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{Location, WeatherReport},
    provider::WeatherProvider,
    render::{Surface, View},
};

#[derive(Debug, Clone, Default)]
pub enum DisplayState {
    #[default]
    Idle,
    Loading,
    ShowingWeather(Box<WeatherReport>),
    ShowingError(String),
}

impl DisplayState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayState::Loading)
    }
}

/// Identifies one submission. Only the newest ticket may change what is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Application state: what is shown, plus the presentational surface.
#[derive(Debug, Default)]
pub struct App {
    state: DisplayState,
    surface: Surface,
    latest: u64,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Enter `Loading` and hand out a ticket for the new request.
    pub fn begin(&mut self) -> RequestTicket {
        self.latest += 1;
        self.state = DisplayState::Loading;
        RequestTicket(self.latest)
    }

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` and leaves everything untouched when a newer request was
    /// started in the meantime.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<WeatherReport, WeatherError>,
        now: Instant,
    ) -> bool {
        if ticket.0 != self.latest {
            warn!(ticket = ticket.0, latest = self.latest, "dropping stale weather response");
            return false;
        }

        match outcome {
            Ok(report) => {
                self.surface.set_background(report.info().category);
                self.state = DisplayState::ShowingWeather(Box::new(report));
            }
            Err(err) => self.fail(err, now),
        }
        true
    }

    fn fail(&mut self, err: WeatherError, now: Instant) {
        let message = err.to_string();
        self.surface.show_error(message.clone(), now);
        self.state = DisplayState::ShowingError(message);
    }

    /// Validate `input`, fetch, and record the outcome.
    ///
    /// Blank input is reported straight away and never reaches the provider.
    pub async fn submit(&mut self, provider: &dyn WeatherProvider, input: &str) -> &DisplayState {
        let city = input.trim();
        if city.is_empty() {
            self.fail(WeatherError::EmptyInput, Instant::now());
            return &self.state;
        }
        self.fetch(provider, Location::City(city.to_owned())).await
    }

    pub async fn fetch(
        &mut self,
        provider: &dyn WeatherProvider,
        location: Location,
    ) -> &DisplayState {
        let ticket = self.begin();
        debug!(provider = %provider.id(), ?location, "submitting");

        let outcome = provider.get_weather(&location).await;
        self.complete(ticket, outcome, Instant::now());
        &self.state
    }

    /// Text for the current state, or `None` while idle or loading.
    pub fn render(&self, color: bool) -> Option<String> {
        match &self.state {
            DisplayState::ShowingWeather(report) => {
                Some(self.surface.render(&View::from_report(report), color))
            }
            DisplayState::ShowingError(_) => self
                .surface
                .visible_error(Instant::now())
                .map(|msg| format!("{msg}\n")),
            DisplayState::Idle | DisplayState::Loading => None,
        }
    }
}
