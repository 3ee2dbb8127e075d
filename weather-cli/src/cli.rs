use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Text};
use weather_core::{
    Config, ProviderId, Units, evaluate_alerts, fetch_historical_weather, fetch_weather,
};

use crate::display;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Use this provider instead of the configured default, e.g. "openweather".
    #[arg(long, global = true, value_parser = parse_provider)]
    pub provider: Option<ProviderId>,

    /// Unit system for this invocation: "metric" or "imperial".
    #[arg(long, global = true, value_parser = parse_units)]
    pub units: Option<Units>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        #[arg(value_name = "PROVIDER", value_parser = parse_provider)]
        target: ProviderId,
    },

    /// Current conditions.
    Current {
        /// Location name; falls back to the configured default location.
        location: Option<String>,
    },

    /// Daily forecast table.
    Forecast {
        location: Option<String>,

        #[arg(long, default_value_t = 5)]
        days: u32,
    },

    /// Current conditions, forecast, charts and alerts in one view.
    Dashboard {
        location: Option<String>,

        #[arg(long, default_value_t = 3)]
        days: u32,
    },

    /// Compare today with a past day.
    History {
        location: Option<String>,

        /// Past date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },

    /// Current conditions of two locations side by side.
    Compare {
        first: String,
        second: String,
    },

    /// Show or change alert thresholds.
    Alerts {
        #[command(subcommand)]
        action: AlertsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// Print the current thresholds.
    Show,

    /// Update one or more thresholds.
    Set {
        /// Alert when the temperature rises above this (°C).
        #[arg(long)]
        high_temp: Option<f64>,

        /// Alert when the temperature drops below this (°C).
        #[arg(long)]
        low_temp: Option<f64>,

        /// Alert when a day's chance of rain exceeds this (%).
        #[arg(long)]
        rain_chance: Option<f64>,

        /// Alert when wind speed exceeds this (km/h).
        #[arg(long)]
        wind: Option<f64>,
    },
}

fn parse_provider(s: &str) -> Result<ProviderId, String> {
    ProviderId::try_from(s).map_err(|e| e.to_string())
}

fn parse_units(s: &str) -> Result<Units, String> {
    Units::try_from(s).map_err(|e| e.to_string())
}

fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load_file().context("failed to load configuration")?;
        let session = with_overrides(&config, self.provider, self.units);
        let units = session.units;

        match self.command {
            Command::Configure { target } => configure(&mut config, target)?,
            Command::Alerts { action } => alerts(&mut config, action)?,
            Command::Current { location } => {
                let location = resolve_location(&session, location)?;
                let data = fetch_weather(&session, &location, 1).await?;
                print_lines(display::current(&data.location, &data.current, units));
            }
            Command::Forecast { location, days } => {
                let location = resolve_location(&session, location)?;
                let data = fetch_weather(&session, &location, days).await?;
                println!("{}", display::location_header(&data.location));
                print_lines(display::forecast_table(&data.forecast.forecast_day, units));
            }
            Command::Dashboard { location, days } => {
                let location = resolve_location(&session, location)?;
                let data = fetch_weather(&session, &location, days).await?;

                print_lines(display::current(&data.location, &data.current, units));
                println!();
                print_lines(display::forecast_table(&data.forecast.forecast_day, units));
                if let Some(today) = data.forecast.first_day() {
                    println!("{}", display::sun_times(today));
                    println!();
                    print_lines(display::charts(today));
                }
                println!();
                print_lines(display::alerts(&evaluate_alerts(&data, &session.alerts)));
            }
            Command::Compare { first, second } => {
                let left = fetch_weather(&session, &first, 1)
                    .await
                    .with_context(|| format!("failed to fetch weather for {first}"))?;
                let right = fetch_weather(&session, &second, 1)
                    .await
                    .with_context(|| format!("failed to fetch weather for {second}"))?;
                print_lines(display::location_comparison(&left, &right, units));
            }
            Command::History { location, date } => {
                let location = resolve_location(&session, location)?;
                let past = fetch_historical_weather(&session, &location, &date).await?;
                let today = fetch_weather(&session, &location, 1).await?;
                print_lines(display::history_comparison(&today, &past, units));
            }
        }

        Ok(())
    }
}

/// `--provider`, `--units` and the environment apply to one invocation and
/// are never saved.
fn with_overrides(config: &Config, provider: Option<ProviderId>, units: Option<Units>) -> Config {
    let mut session = config.clone();
    if let Some(provider) = provider {
        session.set_default_provider(provider);
    }
    if let Some(units) = units {
        session.units = units;
    }
    session.apply_env_overrides();
    session
}

fn resolve_location(config: &Config, location: Option<String>) -> anyhow::Result<String> {
    location
        .or_else(|| config.default_location.clone())
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "No location given and no default location configured.\n\
                 Hint: pass a location, e.g. `weather current London`,\n\
                 or set a default with `weather configure <provider>`."
            )
        })
}

fn configure(config: &mut Config, provider: ProviderId) -> anyhow::Result<()> {
    let api_key = Password::new(&key_prompt(config, provider))
        .without_confirmation()
        .prompt()
        .context("failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.upsert_provider_api_key(provider, api_key.trim().to_string());

    let make_default = match config.default_provider_id() {
        Ok(current) if current == provider => false,
        Ok(current) => Confirm::new(&format!("Use {provider} instead of {current} by default?"))
            .with_default(true)
            .prompt()
            .context("failed to read answer")?,
        Err(_) => true,
    };
    if make_default {
        config.set_default_provider(provider);
    }

    let mut prompt = Text::new("Default location (leave empty to skip):");
    if let Some(current) = config.default_location.as_deref() {
        prompt = prompt.with_default(current);
    }
    if let Some(location) = prompt.prompt_skippable().context("failed to read location")? {
        let location = location.trim();
        if !location.is_empty() {
            config.default_location = Some(location.to_string());
        }
    }

    config.save().context("failed to save configuration")?;
    tracing::info!(%provider, "provider configured");
    println!("Saved configuration for {provider}.");
    Ok(())
}

fn key_prompt(config: &Config, provider: ProviderId) -> String {
    if config.is_provider_configured(provider) {
        format!("New API key for {provider} (replaces the saved one):")
    } else {
        format!("API key for {provider}:")
    }
}

fn alerts(config: &mut Config, action: AlertsCommand) -> anyhow::Result<()> {
    match action {
        AlertsCommand::Show => print_lines(display::thresholds(&config.alerts)),
        AlertsCommand::Set {
            high_temp,
            low_temp,
            rain_chance,
            wind,
        } => {
            let t = &mut config.alerts;
            if let Some(v) = high_temp {
                t.high_temp_c = v;
            }
            if let Some(v) = low_temp {
                t.low_temp_c = v;
            }
            if let Some(v) = rain_chance {
                if !(0.0..=100.0).contains(&v) {
                    return Err(anyhow!("Rain chance must be between 0 and 100, got {v}"));
                }
                t.rain_chance = v;
            }
            if let Some(v) = wind {
                t.wind_kph = v;
            }
            if config.alerts.low_temp_c > config.alerts.high_temp_c {
                return Err(anyhow!("Low temperature threshold is above the high one"));
            }

            config.save().context("failed to save configuration")?;
            print_lines(display::thresholds(&config.alerts));
        }
    }
    Ok(())
}
