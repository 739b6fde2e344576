use air_quality_core::{
    AirQualityClient, AirQualityError, CancellationToken, Config, Coordinates, FixFileSource,
    Locale, LocationSource, PlaceInfo, Pollutant, PollutantGroup, device_location,
};
use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};

use crate::{render, session::Session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "airq", version, about = "Air quality lookup CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key and message language.
    Configure,

    /// Show current air quality for a city.
    Search {
        /// City or place name.
        city: String,

        /// Also fetch temperature, humidity, wind and pressure.
        #[arg(long)]
        weather: bool,

        /// Only list one pollutant (pm25, pm10, co, no2, so2, o3).
        #[arg(long, value_parser = parse_pollutant)]
        pollutant: Option<Pollutant>,
    },

    /// Show current air quality at the device location.
    Here {
        #[arg(long)]
        weather: bool,

        #[arg(long, value_parser = parse_pollutant)]
        pollutant: Option<Pollutant>,
    },

    /// Show recent history for a city, or for the last looked-up place.
    History {
        city: Option<String>,

        /// Window start, unix seconds. Defaults to 7 days before `end`.
        #[arg(long)]
        start: Option<i64>,

        /// Window end, unix seconds. Defaults to now.
        #[arg(long)]
        end: Option<i64>,

        /// Pollutant family to show (all, air, emission, industrial).
        #[arg(long, value_parser = parse_group, default_value = "all")]
        group: PollutantGroup,
    },

    /// Show the result saved by the last lookup.
    Last,
}

fn parse_pollutant(s: &str) -> Result<Pollutant, String> {
    Pollutant::try_from(s).map_err(|e| e.to_string())
}

fn parse_group(s: &str) -> Result<PollutantGroup, String> {
    PollutantGroup::try_from(s).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            command => lookup(command).await,
        }
    }
}

async fn lookup(command: Command) -> anyhow::Result<()> {
    let config = Config::load()?;
    let locale = config.locale;

    // One token for every request this command makes; Ctrl-C aborts them all.
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let result = match command {
        Command::Configure => return configure(),
        Command::Search { city, weather, pollutant } => {
            search(&config, &city, weather, pollutant, &cancel).await
        }
        Command::Here { weather, pollutant } => here(&config, weather, pollutant, &cancel).await,
        Command::History { city, start, end, group } => {
            history(&config, city.as_deref(), start, end, group, &cancel).await
        }
        Command::Last => {
            show_last(locale);
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) => match err.user_message(locale) {
            None => {
                tracing::debug!("Command cancelled");
                Ok(())
            }
            Some(msg) => {
                tracing::debug!(error = %err, "Command failed");
                Err(anyhow!(msg))
            }
        },
    }
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let key = Text::new("OpenWeather API key:")
        .with_help_message("Get one at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(key);

    let locale = Select::new("Message language:", Locale::all().to_vec())
        .prompt()
        .context("Failed to read language")?;
    config.locale = locale;

    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn client_for(config: &Config) -> AirQualityClient {
    let client = AirQualityClient::from_config(config);
    if !client.is_configured() {
        eprintln!(
            "⚠️  No OpenWeather API key configured. Run `airq configure` or set {}.",
            air_quality_core::config::API_KEY_ENV
        );
    }
    client
}

async fn search(
    config: &Config,
    city: &str,
    weather: bool,
    pollutant: Option<Pollutant>,
    cancel: &CancellationToken,
) -> Result<(), AirQualityError> {
    let client = client_for(config);
    let place = client.resolve_city(city, cancel).await?;
    show_conditions(&client, config.locale, place, Some(city), weather, pollutant, cancel).await
}

async fn here(
    config: &Config,
    weather: bool,
    pollutant: Option<Pollutant>,
    cancel: &CancellationToken,
) -> Result<(), AirQualityError> {
    let client = client_for(config);

    let source = config.device.fix_file.clone().map(FixFileSource::new);
    let coords = tokio::select! {
        _ = cancel.cancelled() => return Err(AirQualityError::Cancelled),
        coords = device_location(source.as_ref().map(|s| s as &dyn LocationSource)) => coords?,
    };

    let place = device_place(coords, config.locale);
    show_conditions(&client, config.locale, place, None, weather, pollutant, cancel).await
}

fn device_place(coords: Coordinates, locale: Locale) -> PlaceInfo {
    let name = match locale {
        Locale::En => "Your location",
        Locale::Id => "Lokasi Anda",
    };
    PlaceInfo { name: name.to_string(), country: String::new(), lat: coords.lat, lon: coords.lon }
}

async fn show_conditions(
    client: &AirQualityClient,
    locale: Locale,
    place: PlaceInfo,
    query: Option<&str>,
    weather: bool,
    pollutant: Option<Pollutant>,
    cancel: &CancellationToken,
) -> Result<(), AirQualityError> {
    let conditions = client.fetch_conditions(place.coordinates(), weather, cancel).await?;
    let reading = conditions.pollution.first().clone();

    println!("{}", render::pollution_card(&place.label(), &reading, pollutant, locale));
    if let Some(block) = conditions.weather.as_ref().and_then(|w| render::weather_block(w, locale)) {
        println!();
        println!("{block}");
    }

    let mut session = Session::load();
    session.record(place, reading, query);
    if let Err(err) = session.save() {
        tracing::warn!(error = %err, "Failed to save session");
    }

    Ok(())
}

async fn history(
    config: &Config,
    city: Option<&str>,
    start: Option<i64>,
    end: Option<i64>,
    group: PollutantGroup,
    cancel: &CancellationToken,
) -> Result<(), AirQualityError> {
    let client = client_for(config);

    let place = match city {
        Some(city) => client.resolve_city(city, cancel).await?,
        None => Session::load().last_place.ok_or_else(|| {
            AirQualityError::InvalidInput("no previous place; pass a city name".to_string())
        })?,
    };

    let series = client
        .fetch_historical_pollution(place.coordinates(), start, end, cancel)
        .await?;

    println!("📍 {}", place.label());
    println!("{}", render::history_table(&series, group, config.locale));
    Ok(())
}

fn show_last(locale: Locale) {
    let session = Session::load();

    match (&session.last_place, &session.last_reading) {
        (Some(place), Some(reading)) => {
            println!("{}", render::pollution_card(&place.label(), reading, None, locale));
        }
        _ => println!("No saved lookup yet. Try `airq search <city>`."),
    }

    if let Some(query) = &session.last_query {
        println!();
        println!("Last search: {query}");
    }
}
