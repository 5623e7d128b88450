use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::broadcast::{Receiver, error::TryRecvError};

use skycast_core::{
    Config, CurrentConditions, CurrentWeatherPanel, EventBus, ForecastPanel, ForecastPoint,
    OpenWeatherClient, SearchController, WeatherApi, WeatherEvent,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the on-disk config.
    Configure,

    /// Show current conditions for a location.
    Current {
        /// City name, e.g. "Kyiv" or "London,GB".
        query: String,
    },

    /// Show the 5-day forecast for a location.
    Forecast {
        /// City name.
        query: String,
    },

    /// Look up a location and show its full dashboard.
    Search {
        /// Free-text location query to disambiguate.
        query: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { query } => show_current(&query).await,
            Command::Forecast { query } => show_forecast(&query).await,
            Command::Search { query } => search(&query).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.api_key = Some(key);

    config.save()?;
    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn adapter() -> anyhow::Result<Arc<dyn WeatherApi>> {
    let config = Config::load()?;
    Ok(Arc::new(OpenWeatherClient::new(&config)?))
}

/// Hand every buffered event to a panel callback, in publish order.
fn drain(rx: &mut Receiver<WeatherEvent>, mut apply: impl FnMut(&WeatherEvent)) {
    loop {
        match rx.try_recv() {
            Ok(event) => apply(&event),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}

async fn show_current(query: &str) -> anyhow::Result<()> {
    let api = adapter()?;
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    let controller = SearchController::new(api.clone(), bus);
    let panel = CurrentWeatherPanel::new(api);

    controller.set_query(query);
    controller.commit_search().await;
    drain(&mut rx, |event| panel.handle_event(event));

    match panel.conditions() {
        Some(cc) => print_conditions(&cc),
        None => {
            let message = panel
                .error()
                .unwrap_or_else(|| "no weather data received".to_string());
            anyhow::bail!("{message}");
        }
    }
    Ok(())
}

async fn show_forecast(query: &str) -> anyhow::Result<()> {
    let api = adapter()?;
    let panel = ForecastPanel::new(api);

    panel.load(query).await;

    match panel.forecast() {
        Some(points) => print_forecast(&points),
        None => {
            let message = panel
                .error()
                .unwrap_or_else(|| "no forecast data received".to_string());
            anyhow::bail!("{message}");
        }
    }
    Ok(())
}

async fn search(query: &str) -> anyhow::Result<()> {
    let api = adapter()?;
    let bus = EventBus::new();
    let mut current_rx = bus.subscribe();
    let mut forecast_rx = bus.subscribe();

    let controller = SearchController::new(api.clone(), bus);
    let current_panel = CurrentWeatherPanel::new(api.clone());
    let forecast_panel = ForecastPanel::new(api);

    controller.update_query(query).await;
    if let Some(error) = controller.suggestion_error() {
        anyhow::bail!("{error}");
    }

    let candidates = controller.suggestions();
    if candidates.is_empty() {
        anyhow::bail!("No locations found for '{query}'");
    }

    let labels: Vec<String> = candidates.iter().map(|c| c.display_label()).collect();
    let picked = inquire::Select::new("Pick a location:", labels.clone())
        .prompt()
        .context("Selection cancelled")?;
    let index = labels
        .iter()
        .position(|l| *l == picked)
        .context("Selection did not match any candidate")?;

    controller.select_candidate(&candidates[index]).await;

    drain(&mut current_rx, |event| current_panel.handle_event(event));
    loop {
        match forecast_rx.try_recv() {
            Ok(event) => forecast_panel.handle_event(&event).await,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }

    match current_panel.conditions() {
        Some(cc) => print_conditions(&cc),
        None => {
            if let Some(error) = current_panel.error() {
                eprintln!("current weather: {error}");
            }
        }
    }

    match forecast_panel.forecast() {
        Some(points) => {
            println!();
            print_forecast(&points);
        }
        None => {
            if let Some(error) = forecast_panel.error() {
                eprintln!("forecast: {error}");
            }
        }
    }

    Ok(())
}

fn print_conditions(cc: &CurrentConditions) {
    println!("{}", cc.display_location);
    println!("  {}°C, {} ({})", cc.temperature_c, cc.condition, cc.icon);
    println!("  humidity   {}%", cc.humidity_pct);
    println!("  wind       {} m/s", cc.wind_speed);
    println!("  visibility {} km", cc.visibility_km);
}

fn print_forecast(points: &[ForecastPoint]) {
    println!("5-day forecast:");
    for p in points {
        println!(
            "  {}  {:>3}..{:<3}°C  {} ({}), humidity {}%, wind {} m/s",
            p.date, p.temp_min_c, p.temp_max_c, p.condition, p.icon, p.humidity_pct, p.wind_speed
        );
    }
}
