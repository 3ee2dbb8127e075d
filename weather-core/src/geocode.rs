//! Free-text place name → coordinates, for providers without built-in lookup.

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    model::Coordinates,
    provider::{ProviderId, get_json},
};

const GEOCODE_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";

#[derive(Debug, Clone)]
pub struct Geocoder {
    api_key: String,
    http: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEOCODE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Top match only. An empty result set is [`WeatherError::NotFound`].
    pub async fn resolve(&self, location: &str) -> Result<Coordinates> {
        let request = self.http.get(&self.base_url).query(&[
            ("q", location),
            ("limit", "1"),
            ("appid", self.api_key.as_str()),
        ]);

        let matches: Vec<GeoMatch> = get_json(ProviderId::OpenWeather, "geocoding", request).await?;

        let top = matches
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(location.to_string()))?;

        tracing::debug!(
            query = location,
            name = %top.name,
            lat = top.lat,
            lon = top.lon,
            "geocoded"
        );

        Ok(Coordinates {
            lat: top.lat,
            lon: top.lon,
            name: top.name,
            country: top.country.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeoMatch {
    name: String,
    lat: f64,
    lon: f64,
    country: Option<String>,
}
