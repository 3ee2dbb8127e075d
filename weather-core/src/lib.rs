//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers, each normalized into one canonical model
//! - Client-side daily aggregation and derived metrics for raw-hourly providers
//! - Terminal chart rendering and threshold alerts over the canonical model
//!
//! [`fetch_weather`] and [`fetch_historical_weather`] are the fetch entry
//! points; everything else consumes what they return.

pub mod alerts;
pub mod chart;
pub mod config;
pub mod error;
pub mod geocode;
pub mod metrics;
pub mod model;
pub mod progress;
pub mod provider;

mod aggregate;

use chrono::NaiveDate;

pub use alerts::{Alert, AlertKind, evaluate_alerts};
pub use config::{AlertThresholds, Config, ProviderConfig, Units};
pub use error::{Result, WeatherError};
pub use model::{HistoricalData, WeatherData};
pub use provider::{ProviderId, WeatherProvider};

use progress::Spinner;
use provider::default_provider_from_config;

/// Current conditions and up to `days` forecast days from the configured
/// default provider.
pub async fn fetch_weather(config: &Config, location: &str, days: u32) -> Result<WeatherData> {
    let provider = default_provider_from_config(config)?;
    fetch_weather_with(provider.as_ref(), location, days).await
}

/// One historical day (`YYYY-MM-DD`) from the configured default provider.
pub async fn fetch_historical_weather(
    config: &Config,
    location: &str,
    date: &str,
) -> Result<HistoricalData> {
    let provider = default_provider_from_config(config)?;
    fetch_historical_weather_with(provider.as_ref(), location, date).await
}

/// Same as [`fetch_weather`] against an already constructed provider.
pub async fn fetch_weather_with(
    provider: &dyn WeatherProvider,
    location: &str,
    days: u32,
) -> Result<WeatherData> {
    let location = require_location(location)?;
    if days < 1 {
        return Err(WeatherError::Validation(format!(
            "Invalid day count {days}: at least one day is required"
        )));
    }

    tracing::debug!(provider = %provider.id(), location, days, "fetching weather");
    let _spinner = Spinner::start("Fetching weather data");
    provider.fetch_weather(location, days).await
}

/// Same as [`fetch_historical_weather`] against an already constructed provider.
pub async fn fetch_historical_weather_with(
    provider: &dyn WeatherProvider,
    location: &str,
    date: &str,
) -> Result<HistoricalData> {
    let location = require_location(location)?;
    let date = parse_date(date)?;

    tracing::debug!(provider = %provider.id(), location, %date, "fetching historical weather");
    let _spinner = Spinner::start("Fetching historical data");
    provider.fetch_historical(location, date).await
}

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        WeatherError::Validation(format!(
            "Invalid date '{date}': expected format YYYY-MM-DD (e.g. 2024-06-01)"
        ))
    })
}

fn require_location(location: &str) -> Result<&str> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::Validation("Location must not be empty".to_string()));
    }
    Ok(trimmed)
}
