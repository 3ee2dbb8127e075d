//! Canonical weather model.
//!
//! Every provider adapter normalizes into these types, and nothing downstream
//! (display, alerts, charts) looks at provider payloads directly. Temperatures
//! are stored in Celsius with a Fahrenheit mirror, wind speeds in km/h with a
//! mph mirror.

use serde::{Deserialize, Serialize};

use crate::metrics::{celsius_to_fahrenheit, kmh_to_mph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
    pub localtime: String,
}

/// Aggregation compares conditions by `text` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temp_c: f64,
    pub temp_f: f64,
    pub feels_like_c: f64,
    pub feels_like_f: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub wind_degree: u16,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub vis_km: f64,
    pub uv: f64,
    pub condition: Condition,
    pub is_day: bool,
}

/// Provider-neutral inputs for [`CurrentWeather`]; the derived unit mirrors
/// are filled in by [`CurrentWeather::new`].
#[derive(Debug, Clone)]
pub struct CurrentReading {
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    pub wind_degree: u16,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub vis_km: f64,
    pub uv: f64,
    pub condition: Condition,
    pub is_day: bool,
}

impl CurrentWeather {
    pub fn new(reading: CurrentReading) -> Self {
        Self {
            temp_c: reading.temp_c,
            temp_f: celsius_to_fahrenheit(reading.temp_c),
            feels_like_c: reading.feels_like_c,
            feels_like_f: celsius_to_fahrenheit(reading.feels_like_c),
            humidity: reading.humidity.min(100),
            wind_kph: reading.wind_kph,
            wind_mph: kmh_to_mph(reading.wind_kph),
            wind_degree: reading.wind_degree % 360,
            wind_dir: reading.wind_dir,
            pressure_mb: reading.pressure_mb,
            precip_mm: reading.precip_mm,
            vis_km: reading.vis_km,
            uv: reading.uv.max(0.0),
            condition: reading.condition,
            is_day: reading.is_day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hour {
    pub time_epoch: i64,
    /// Local time, `YYYY-MM-DD HH:MM`.
    pub time: String,
    pub temp_c: f64,
    pub condition: Condition,
    pub chance_of_rain: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub max_wind_kph: f64,
    pub total_precip_mm: f64,
    pub daily_chance_of_rain: u8,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
}

impl Astro {
    /// Shown when the provider has no sunrise/sunset for a day.
    pub const PLACEHOLDER: &'static str = "N/A";

    pub fn unavailable() -> Self {
        Self {
            sunrise: Self::PLACEHOLDER.to_string(),
            sunset: Self::PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub date_epoch: i64,
    pub day: Day,
    pub astro: Astro,
    pub hour: Vec<Hour>,
}

/// Chronological, one entry per date, never longer than the days requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Forecast {
    pub forecast_day: Vec<ForecastDay>,
}

impl Forecast {
    pub fn first_day(&self) -> Option<&ForecastDay> {
        self.forecast_day.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub location: Location,
    pub forecast: Forecast,
}

/// Single-day history: always exactly one [`ForecastDay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub location: Location,
    pub forecast: Forecast,
}

impl HistoricalData {
    pub fn day(&self) -> Option<&ForecastDay> {
        self.forecast.first_day()
    }
}

/// Result of geocoding a free-text location.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temp_c: f64) -> CurrentReading {
        CurrentReading {
            temp_c,
            feels_like_c: temp_c - 2.0,
            humidity: 140,
            wind_kph: 18.0,
            wind_degree: 450,
            wind_dir: "E".into(),
            pressure_mb: 1012.0,
            precip_mm: 0.0,
            vis_km: 10.0,
            uv: -1.0,
            condition: Condition::default(),
            is_day: true,
        }
    }

    #[test]
    fn current_weather_derives_imperial_mirrors() {
        let current = CurrentWeather::new(reading(20.0));
        assert!((current.temp_f - 68.0).abs() < 1e-9);
        assert!((current.feels_like_f - 64.4).abs() < 1e-9);
        assert!((current.wind_mph - 11.184_681).abs() < 1e-5);
    }

    #[test]
    fn current_weather_clamps_out_of_range_readings() {
        let current = CurrentWeather::new(reading(0.0));
        assert_eq!(current.humidity, 100);
        assert_eq!(current.wind_degree, 90);
        assert_eq!(current.uv, 0.0);
    }

    #[test]
    fn historical_day_is_first_forecast_day() {
        let hist = HistoricalData {
            location: Location {
                name: "Oslo".into(),
                region: String::new(),
                country: "NO".into(),
                lat: 59.9,
                lon: 10.7,
                tz_id: "Europe/Oslo".into(),
                localtime_epoch: 0,
                localtime: "1970-01-01 01:00".into(),
            },
            forecast: Forecast::default(),
        };
        assert!(hist.day().is_none());
    }
}
