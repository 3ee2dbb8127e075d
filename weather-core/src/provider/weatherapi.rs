use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    metrics::clamp_percent,
    model::{
        Astro, Condition, CurrentReading, CurrentWeather, Day, Forecast, ForecastDay,
        HistoricalData, Hour, Location, WeatherData,
    },
    provider::get_json,
};

use super::{ProviderId, WeatherProvider};

const BASE_URL: &str = "https://api.weatherapi.com/v1";

/// WeatherAPI.com: current, per-day and per-hour data arrive pre-aggregated in
/// one response, so normalization is a field copy.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch_forecast(&self, location: &str, days: u32) -> Result<WaForecastResponse> {
        let url = format!("{}/forecast.json", self.base_url);
        let days_param = days.to_string();

        let request = self.http.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("q", location),
            ("days", days_param.as_str()),
            ("aqi", "no"),
            ("alerts", "no"),
        ]);

        get_json(ProviderId::WeatherApi, "forecast", request).await
    }

    async fn fetch_history(&self, location: &str, date: NaiveDate) -> Result<WaHistoryResponse> {
        let url = format!("{}/history.json", self.base_url);
        let dt = date.format("%Y-%m-%d").to_string();

        let request = self.http.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("q", location),
            ("dt", dt.as_str()),
        ]);

        get_json(ProviderId::WeatherApi, "history", request).await
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn fetch_weather(&self, location: &str, days: u32) -> Result<WeatherData> {
        let parsed = self.fetch_forecast(location, days).await?;
        Ok(parsed.into_weather_data(days as usize))
    }

    async fn fetch_historical(&self, location: &str, date: NaiveDate) -> Result<HistoricalData> {
        let parsed = self.fetch_history(location, date).await?;

        let day = parsed.forecast.forecastday.into_iter().next().ok_or_else(|| {
            WeatherError::decode(
                ProviderId::WeatherApi,
                "history",
                "response contained no forecastday data",
            )
        })?;

        Ok(HistoricalData {
            location: parsed.location.into(),
            forecast: Forecast {
                forecast_day: vec![day.into()],
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    tz_id: String,
    #[serde(default)]
    localtime_epoch: i64,
    #[serde(default)]
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    #[serde(default)]
    is_day: u8,
    condition: WaCondition,
    wind_kph: f64,
    #[serde(default)]
    wind_degree: u16,
    #[serde(default)]
    wind_dir: String,
    #[serde(default)]
    pressure_mb: f64,
    #[serde(default)]
    precip_mm: f64,
    humidity: u8,
    #[serde(default)]
    vis_km: f64,
    #[serde(default)]
    uv: f64,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    #[serde(default)]
    maxwind_kph: f64,
    #[serde(default)]
    totalprecip_mm: f64,
    #[serde(default)]
    daily_chance_of_rain: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time_epoch: i64,
    time: String,
    temp_c: f64,
    condition: WaCondition,
    #[serde(default)]
    chance_of_rain: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    date_epoch: i64,
    day: WaDay,
    astro: Option<WaAstro>,
    #[serde(default)]
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaHistoryResponse {
    location: WaLocation,
    forecast: WaForecast,
}

impl WaForecastResponse {
    fn into_weather_data(self, days: usize) -> WeatherData {
        WeatherData {
            current: self.current.into(),
            location: self.location.into(),
            forecast: Forecast {
                forecast_day: self
                    .forecast
                    .forecastday
                    .into_iter()
                    .take(days)
                    .map(ForecastDay::from)
                    .collect(),
            },
        }
    }
}

impl From<WaLocation> for Location {
    fn from(l: WaLocation) -> Self {
        Location {
            name: l.name,
            region: l.region,
            country: l.country,
            lat: l.lat,
            lon: l.lon,
            tz_id: l.tz_id,
            localtime_epoch: l.localtime_epoch,
            localtime: l.localtime,
        }
    }
}

impl From<WaCondition> for Condition {
    fn from(c: WaCondition) -> Self {
        Condition {
            text: c.text,
            icon: c.icon,
            code: c.code,
        }
    }
}

impl From<WaCurrent> for CurrentWeather {
    fn from(c: WaCurrent) -> Self {
        CurrentWeather::new(CurrentReading {
            temp_c: c.temp_c,
            feels_like_c: c.feelslike_c,
            humidity: c.humidity,
            wind_kph: c.wind_kph,
            wind_degree: c.wind_degree,
            wind_dir: c.wind_dir,
            pressure_mb: c.pressure_mb,
            precip_mm: c.precip_mm,
            vis_km: c.vis_km,
            uv: c.uv,
            condition: c.condition.into(),
            is_day: c.is_day == 1,
        })
    }
}

impl From<WaForecastDay> for ForecastDay {
    fn from(d: WaForecastDay) -> Self {
        ForecastDay {
            date: d.date,
            date_epoch: d.date_epoch,
            day: Day {
                max_temp_c: d.day.maxtemp_c,
                min_temp_c: d.day.mintemp_c,
                avg_temp_c: d.day.avgtemp_c,
                max_wind_kph: d.day.maxwind_kph,
                total_precip_mm: d.day.totalprecip_mm,
                daily_chance_of_rain: clamp_percent(d.day.daily_chance_of_rain),
                condition: d.day.condition.into(),
            },
            astro: d
                .astro
                .map(|a| Astro {
                    sunrise: a.sunrise,
                    sunset: a.sunset,
                })
                .unwrap_or_else(Astro::unavailable),
            hour: d.hour.into_iter().map(Hour::from).collect(),
        }
    }
}

impl From<WaHour> for Hour {
    fn from(h: WaHour) -> Self {
        Hour {
            time_epoch: h.time_epoch,
            time: h.time,
            temp_c: h.temp_c,
            condition: h.condition.into(),
            chance_of_rain: clamp_percent(h.chance_of_rain),
        }
    }
}
