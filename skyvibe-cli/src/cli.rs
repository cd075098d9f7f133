use std::io::IsTerminal;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use skyvibe_core::{
    App, Config, Coordinates, DisplayState, Location, ProviderId, WeatherProvider,
    provider::{default_provider_from_config, provider_from_config},
};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyvibe", version, about = "Current weather and a 5-hour outlook in your terminal")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable coloured output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store credentials or defaults for a provider.
    Configure {
        /// Provider short name, "openmeteo" or "openweather".
        provider: String,

        /// City shown when no location is given.
        #[arg(long)]
        city: Option<String>,
    },

    /// Show weather once.
    Show {
        /// City name; falls back to the configured default city.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Override the default provider.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Prompt for cities until you quit. `:theme` cycles the colour theme.
    Interactive {
        /// Override the default provider.
        #[arg(long)]
        provider: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let color = !self.no_color && std::io::stdout().is_terminal();
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { provider, city } => configure(&mut config, &provider, city),
            Command::Show {
                city,
                lat,
                lon,
                provider,
            } => {
                let provider = select_provider(&config, provider.as_deref())?;
                let location = match (lat, lon, city) {
                    (Some(lat), Some(lon), _) => Location::Coordinates(Coordinates::new(lat, lon)),
                    (_, _, Some(city)) => Location::City(city),
                    _ => Location::City(config.default_city().to_owned()),
                };
                show(provider.as_ref(), location, color).await
            }
            Command::Interactive { provider } => {
                let provider = select_provider(&config, provider.as_deref())?;
                interactive(provider.as_ref(), config.default_city(), color).await
            }
        }
    }
}

fn select_provider(
    config: &Config,
    requested: Option<&str>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    match requested {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, config),
        None => default_provider_from_config(config),
    }
}

fn configure(config: &mut Config, provider: &str, city: Option<String>) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    if id.requires_api_key() {
        let key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("API key must not be empty"));
        }
        config.upsert_provider_api_key(id, key.to_owned());
    }
    config.set_default_provider(id);

    if let Some(city) = city {
        config.default_city = Some(city);
    }

    config.save()?;
    println!(
        "Default provider set to {id}. Config saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn show(provider: &dyn WeatherProvider, location: Location, color: bool) -> anyhow::Result<()> {
    let mut app = App::new();

    app.fetch(provider, location).await;

    if let DisplayState::ShowingError(message) = app.state() {
        return Err(anyhow!(message.clone()));
    }
    if let Some(text) = app.render(color) {
        print!("{text}");
    }
    Ok(())
}

async fn interactive(
    provider: &dyn WeatherProvider,
    default_city: &str,
    color: bool,
) -> anyhow::Result<()> {
    let mut app = App::new();

    app.fetch(provider, Location::City(default_city.to_owned())).await;
    print_state(&app, color);

    loop {
        let input = match Text::new("City:")
            .with_help_message(":theme to change colours, :quit to leave")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        match input.trim() {
            ":q" | ":quit" => break,
            ":theme" => {
                let theme = app.surface_mut().cycle_theme();
                info!(%theme, "theme changed");
                println!("Theme: {theme}");
                print_state(&app, color);
            }
            city => {
                app.submit(provider, city).await;
                print_state(&app, color);
            }
        }
    }

    Ok(())
}

fn print_state(app: &App, color: bool) {
    let Some(text) = app.render(color) else {
        return;
    };
    if matches!(app.state(), DisplayState::ShowingError(_)) {
        eprint!("{text}");
    } else {
        print!("{text}");
    }
}
