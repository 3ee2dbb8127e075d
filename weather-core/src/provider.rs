use crate::{
    Config,
    error::{Result, WeatherError},
    model::{HistoricalData, WeatherData},
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(WeatherError::Configuration(format!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            ))),
        }
    }
}

/// One upstream weather service, normalized into the canonical model.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Current conditions plus up to `days` forecast days.
    async fn fetch_weather(&self, location: &str, days: u32) -> Result<WeatherData>;

    /// A single historical day for `location`.
    async fn fetch_historical(&self, location: &str, date: NaiveDate) -> Result<HistoricalData>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(id: ProviderId, config: &Config) -> Result<Box<dyn WeatherProvider>> {
    let api_key = config
        .provider_api_key(id)
        .ok_or_else(|| WeatherError::missing_api_key(id))?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            Box::new(OpenWeatherProvider::new(api_key.to_owned(), config.units))
        }
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(api_key.to_owned())),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Send a prepared GET and decode the JSON body, mapping each failure to its
/// error kind.
pub(crate) async fn get_json<T: DeserializeOwned>(
    provider: ProviderId,
    context: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    let res = request
        .send()
        .await
        .map_err(|source| WeatherError::Transport { provider, context, source })?;

    let body = read_success_body(provider, context, res).await?;

    serde_json::from_str(&body).map_err(|e| WeatherError::decode(provider, context, e))
}

async fn read_success_body(
    provider: ProviderId,
    context: &'static str,
    res: Response,
) -> Result<String> {
    let status = res.status();
    tracing::debug!(%provider, context, %status, path = res.url().path(), "provider response");

    let body = res
        .text()
        .await
        .map_err(|source| WeatherError::Transport { provider, context, source })?;

    if !status.is_success() {
        tracing::warn!(%provider, context, %status, "provider returned non-success status");
        return Err(WeatherError::Provider {
            provider,
            context,
            status,
            body,
        });
    }

    Ok(body)
}
