use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    aggregate::{AverageRule, DailyAggregator, RainChanceRule, Sample, SunTimes, format_local},
    config::Units,
    error::{Result, WeatherError},
    geocode::Geocoder,
    metrics::{
        compass_direction, fahrenheit_to_celsius, meters_to_km, mph_to_kmh, mps_to_kmh,
        precipitation_mm,
    },
    model::{
        Condition, Coordinates, CurrentReading, CurrentWeather, Forecast, HistoricalData,
        Location, WeatherData,
    },
    provider::get_json,
};

use super::{ProviderId, WeatherProvider};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const ICON_URL: &str = "https://openweathermap.org/img/wn";
const SECONDS_PER_DAY: i64 = 86_400;

/// OpenWeather: geocoding, current conditions and a flat 3-hourly forecast
/// are separate calls, and daily summaries are computed here.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    http: Client,
    base_url: String,
    geocoder: Geocoder,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: Units) -> Self {
        let geocoder = Geocoder::new(api_key.clone());
        Self {
            api_key,
            units,
            http: Client::new(),
            base_url: BASE_URL.to_string(),
            geocoder,
        }
    }

    /// Point both the data and geocoding endpoints somewhere else (tests, proxies).
    pub fn with_base_urls(
        api_key: String,
        units: Units,
        base_url: impl Into<String>,
        geocode_url: impl Into<String>,
    ) -> Self {
        let geocoder = Geocoder::with_base_url(api_key.clone(), geocode_url);
        Self {
            api_key,
            units,
            http: Client::new(),
            base_url: base_url.into(),
            geocoder,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        context: &'static str,
        coords: &Coordinates,
        extra: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);

        let request = self
            .http
            .get(url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", self.units.as_str().to_string()),
                ("appid", self.api_key.clone()),
            ])
            .query(extra);

        get_json(ProviderId::OpenWeather, context, request).await
    }

    async fn time_machine(&self, coords: &Coordinates, dt: i64) -> Result<OwTimeMachineResponse> {
        self.get("onecall/timemachine", "history", coords, &[("dt", dt.to_string())])
            .await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn fetch_weather(&self, location: &str, days: u32) -> Result<WeatherData> {
        let coords = self.geocoder.resolve(location).await?;
        let current: OwCurrentResponse = self.get("weather", "current", &coords, &[]).await?;
        let forecast: OwForecastResponse = self.get("forecast", "forecast", &coords, &[]).await?;

        Ok(normalize_weather(&coords, current, forecast, self.units, days as usize))
    }

    async fn fetch_historical(&self, location: &str, date: NaiveDate) -> Result<HistoricalData> {
        let coords = self.geocoder.resolve(location).await?;
        let dt = date.and_time(NaiveTime::MIN).and_utc().timestamp();

        let mut payload = self.time_machine(&coords, dt).await?;

        // The window covers one UTC day; away from UTC the local date spills into a neighbour.
        if let Some(extra_dt) = neighbour_window(dt, payload.timezone_offset) {
            let extra = self.time_machine(&coords, extra_dt).await?;
            payload.merge_hourly(extra.hourly);
        }

        normalize_historical(&coords, payload, self.units, date)
    }
}

/// Start of the other UTC day that the local date named by `utc_midnight`
/// overlaps at this offset, if any.
fn neighbour_window(utc_midnight: i64, offset_secs: i32) -> Option<i64> {
    match offset_secs.signum() {
        -1 => Some(utc_midnight + SECONDS_PER_DAY),
        1 => Some(utc_midnight - SECONDS_PER_DAY),
        _ => None,
    }
}

fn normalize_weather(
    coords: &Coordinates,
    current: OwCurrentResponse,
    forecast: OwForecastResponse,
    units: Units,
    days: usize,
) -> WeatherData {
    let offset = utc_offset(forecast.city.timezone.unwrap_or(current.timezone));
    let samples: Vec<Sample> = forecast
        .list
        .into_iter()
        .map(|item| item.into_sample(units))
        .collect();

    let sun = match (forecast.city.sunrise, forecast.city.sunset) {
        (Some(sunrise), Some(sunset)) => Some(SunTimes { sunrise, sunset }),
        _ => None,
    };

    let aggregator =
        DailyAggregator::new(offset, AverageRule::Midrange, RainChanceRule::ConditionFrequency)
            .with_sun_times(sun);

    let name = if forecast.city.name.is_empty() { coords.name.clone() } else { forecast.city.name };
    let country = forecast.city.country.unwrap_or_else(|| coords.country.clone());

    WeatherData {
        location: Location {
            name,
            region: String::new(),
            country,
            lat: coords.lat,
            lon: coords.lon,
            tz_id: format!("UTC{offset}"),
            localtime_epoch: current.dt,
            localtime: format_local(current.dt, offset),
        },
        current: current.into_current(units),
        forecast: Forecast {
            forecast_day: aggregator.aggregate(&samples, days),
        },
    }
}

fn normalize_historical(
    coords: &Coordinates,
    payload: OwTimeMachineResponse,
    units: Units,
    date: NaiveDate,
) -> Result<HistoricalData> {
    let offset = utc_offset(payload.timezone_offset);
    let samples: Vec<Sample> = payload
        .hourly
        .into_iter()
        .map(|item| item.into_sample(units))
        .collect();

    let sun = match (payload.current.sunrise, payload.current.sunset) {
        (Some(sunrise), Some(sunset)) => Some(SunTimes { sunrise, sunset }),
        _ => None,
    };

    let day = DailyAggregator::new(offset, AverageRule::Mean, RainChanceRule::Unavailable)
        .with_sun_times(sun)
        .aggregate_date(&samples, date)
        .ok_or_else(|| {
            WeatherError::decode(
                ProviderId::OpenWeather,
                "history",
                format!("response contained no hourly data for {date}"),
            )
        })?;

    let tz_id = payload
        .timezone
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| format!("UTC{offset}"));

    Ok(HistoricalData {
        location: Location {
            name: coords.name.clone(),
            region: String::new(),
            country: coords.country.clone(),
            lat: payload.lat.unwrap_or(coords.lat),
            lon: payload.lon.unwrap_or(coords.lon),
            tz_id,
            localtime_epoch: payload.current.dt,
            localtime: format_local(payload.current.dt, offset),
        },
        forecast: Forecast {
            forecast_day: vec![day],
        },
    })
}

fn utc_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn to_celsius(units: Units, temp: f64) -> f64 {
    match units {
        Units::Metric => temp,
        Units::Imperial => fahrenheit_to_celsius(temp),
    }
}

/// Metric wind arrives in m/s, imperial in mph.
fn to_kmh(units: Units, speed: f64) -> f64 {
    match units {
        Units::Metric => mps_to_kmh(speed),
        Units::Imperial => mph_to_kmh(speed),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

/// First weather entry as a canonical condition plus its coarse category.
fn condition_of(weather: &[OwWeather]) -> (Condition, String) {
    match weather.first() {
        Some(w) => (
            Condition {
                text: capitalize(&w.description),
                icon: if w.icon.is_empty() {
                    String::new()
                } else {
                    format!("{ICON_URL}/{}@2x.png", w.icon)
                },
                code: w.id,
            },
            w.main.clone(),
        ),
        None => (
            Condition {
                text: "Unknown".to_string(),
                ..Condition::default()
            },
            String::new(),
        ),
    }
}

#[derive(Debug, Deserialize, Default)]
struct OwVolume {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

impl OwVolume {
    fn total(&self) -> f64 {
        self.one_hour.or(self.three_hours).unwrap_or(0.0)
    }
}

/// Rain plus snow water equivalent for one sample window.
fn sample_precip(rain: &Option<OwVolume>, snow: &Option<OwVolume>) -> f64 {
    rain.as_ref().map_or(0.0, OwVolume::total) + snow.as_ref().map_or(0.0, OwVolume::total)
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    pressure: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    visibility: f64,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    timezone: i32,
}

impl OwCurrentResponse {
    fn into_current(self, units: Units) -> CurrentWeather {
        let (condition, _) = condition_of(&self.weather);
        let temp_c = to_celsius(units, self.main.temp);
        let is_day = match (self.sys.sunrise, self.sys.sunset) {
            (Some(rise), Some(set)) => self.dt >= rise && self.dt < set,
            _ => true,
        };

        CurrentWeather::new(CurrentReading {
            temp_c,
            feels_like_c: self.main.feels_like.map_or(temp_c, |f| to_celsius(units, f)),
            humidity: self.main.humidity,
            wind_kph: to_kmh(units, self.wind.speed),
            wind_degree: self.wind.deg.rem_euclid(360.0) as u16,
            wind_dir: compass_direction(self.wind.deg).to_string(),
            pressure_mb: self.main.pressure,
            precip_mm: precipitation_mm(
                self.rain.and_then(|r| r.one_hour),
                self.snow.and_then(|s| s.one_hour),
            ),
            vis_km: meters_to_km(self.visibility),
            uv: 0.0,
            condition,
            is_day,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    pop: Option<f64>,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
}

impl OwForecastItem {
    fn into_sample(self, units: Units) -> Sample {
        let (condition, category) = condition_of(&self.weather);
        Sample {
            epoch: self.dt,
            temp_c: to_celsius(units, self.main.temp),
            wind_kph: to_kmh(units, self.wind.speed),
            precip_mm: sample_precip(&self.rain, &self.snow),
            condition,
            category,
            pop: self.pop,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct OwCity {
    #[serde(default)]
    name: String,
    country: Option<String>,
    timezone: Option<i32>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: OwCity,
    list: Vec<OwForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwHourlyItem {
    dt: i64,
    temp: f64,
    #[serde(default)]
    wind_speed: f64,
    #[serde(default)]
    weather: Vec<OwWeather>,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
}

impl OwHourlyItem {
    /// Hourly history has no usable probability of precipitation.
    fn into_sample(self, units: Units) -> Sample {
        let (condition, category) = condition_of(&self.weather);
        Sample {
            epoch: self.dt,
            temp_c: to_celsius(units, self.temp),
            wind_kph: to_kmh(units, self.wind_speed),
            precip_mm: sample_precip(&self.rain, &self.snow),
            condition,
            category,
            pop: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwTimeMachineCurrent {
    dt: i64,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwTimeMachineResponse {
    lat: Option<f64>,
    lon: Option<f64>,
    timezone: Option<String>,
    #[serde(default)]
    timezone_offset: i32,
    current: OwTimeMachineCurrent,
    #[serde(default)]
    hourly: Vec<OwHourlyItem>,
}

impl OwTimeMachineResponse {
    /// Fold a second window in, chronologically, without repeating an hour.
    fn merge_hourly(&mut self, extra: Vec<OwHourlyItem>) {
        self.hourly.extend(extra);
        self.hourly.sort_by_key(|h| h.dt);
        self.hourly.dedup_by_key(|h| h.dt);
    }
}
