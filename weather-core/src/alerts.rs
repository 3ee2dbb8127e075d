use crate::{config::AlertThresholds, model::WeatherData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    HighTemperature,
    LowTemperature,
    HighWind,
    RainLikely,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// Compare current conditions and every forecast day against `thresholds`.
pub fn evaluate_alerts(data: &WeatherData, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let current = &data.current;

    if current.temp_c > thresholds.high_temp_c {
        alerts.push(Alert {
            kind: AlertKind::HighTemperature,
            message: format!(
                "High temperature ({:.1}°C) exceeds threshold ({:.1}°C)",
                current.temp_c, thresholds.high_temp_c
            ),
        });
    }

    if current.temp_c < thresholds.low_temp_c {
        alerts.push(Alert {
            kind: AlertKind::LowTemperature,
            message: format!(
                "Low temperature ({:.1}°C) below threshold ({:.1}°C)",
                current.temp_c, thresholds.low_temp_c
            ),
        });
    }

    if current.wind_kph > thresholds.wind_kph {
        alerts.push(Alert {
            kind: AlertKind::HighWind,
            message: format!(
                "High wind speed ({:.1} km/h) exceeds threshold ({:.1} km/h)",
                current.wind_kph, thresholds.wind_kph
            ),
        });
    }

    for day in &data.forecast.forecast_day {
        if f64::from(day.day.daily_chance_of_rain) > thresholds.rain_chance {
            alerts.push(Alert {
                kind: AlertKind::RainLikely,
                message: format!(
                    "High chance of rain ({}%) on {} exceeds threshold ({:.0}%)",
                    day.day.daily_chance_of_rain, day.date, thresholds.rain_chance
                ),
            });
        }
    }

    alerts
}
