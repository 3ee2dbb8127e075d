//! Human-readable rendering of the canonical model.
//!
//! Everything here returns lines instead of printing so the command handlers
//! decide where output goes.

use weather_core::{
    Alert, AlertThresholds, HistoricalData, Units, WeatherData,
    chart::{self, TEMPERATURE_CHART_HEIGHT},
    metrics::{celsius_to_fahrenheit, kmh_to_mph},
    model::{CurrentWeather, ForecastDay, Location},
};

fn temp(units: Units, celsius: f64) -> String {
    match units {
        Units::Metric => format!("{celsius:.1}°C"),
        Units::Imperial => format!("{:.1}°F", celsius_to_fahrenheit(celsius)),
    }
}

/// Temperature difference; an offset, so no +32 for Fahrenheit.
fn temp_delta(units: Units, delta_c: f64) -> String {
    match units {
        Units::Metric => format!("{delta_c:+.1}°C"),
        Units::Imperial => format!("{:+.1}°F", delta_c * 9.0 / 5.0),
    }
}

fn wind(units: Units, kph: f64) -> String {
    match units {
        Units::Metric => format!("{kph:.1} km/h"),
        Units::Imperial => format!("{:.1} mph", kmh_to_mph(kph)),
    }
}

pub fn location_header(location: &Location) -> String {
    let mut place = location.name.clone();
    if !location.region.is_empty() {
        place.push_str(", ");
        place.push_str(&location.region);
    }
    if !location.country.is_empty() {
        place.push_str(", ");
        place.push_str(&location.country);
    }
    format!("{place} (local time {}, {})", location.localtime, location.tz_id)
}

pub fn current(location: &Location, current: &CurrentWeather, units: Units) -> Vec<String> {
    let (temp_now, feels_like, wind_speed) = match units {
        Units::Metric => (
            format!("{:.1}°C", current.temp_c),
            format!("{:.1}°C", current.feels_like_c),
            format!("{:.1} km/h", current.wind_kph),
        ),
        Units::Imperial => (
            format!("{:.1}°F", current.temp_f),
            format!("{:.1}°F", current.feels_like_f),
            format!("{:.1} mph", current.wind_mph),
        ),
    };

    vec![
        location_header(location),
        format!("  {}{}", current.condition.text, if current.is_day { "" } else { " (night)" }),
        format!("  Temperature: {temp_now} (feels like {feels_like})"),
        format!("  Humidity:    {}%", current.humidity),
        format!("  Wind:        {wind_speed} {} ({}°)", current.wind_dir, current.wind_degree),
        format!("  Pressure:    {:.0} mb", current.pressure_mb),
        format!("  Precip:      {:.1} mm", current.precip_mm),
        format!("  Visibility:  {:.1} km", current.vis_km),
        format!("  UV index:    {:.1}", current.uv),
    ]
}

pub fn forecast_table(days: &[ForecastDay], units: Units) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<12} {:>9} {:>9} {:>9} {:>11} {:>8} {:>5}  {}",
        "Date", "Max", "Min", "Avg", "Wind", "Precip", "Rain", "Condition"
    )];

    for d in days {
        lines.push(format!(
            "{:<12} {:>9} {:>9} {:>9} {:>11} {:>5.1} mm {:>4}%  {}",
            d.date,
            temp(units, d.day.max_temp_c),
            temp(units, d.day.min_temp_c),
            temp(units, d.day.avg_temp_c),
            wind(units, d.day.max_wind_kph),
            d.day.total_precip_mm,
            d.day.daily_chance_of_rain,
            d.day.condition.text,
        ));
    }

    lines
}

pub fn sun_times(day: &ForecastDay) -> String {
    format!("Sunrise {}  Sunset {}", day.astro.sunrise, day.astro.sunset)
}

pub fn charts(day: &ForecastDay) -> Vec<String> {
    if day.hour.is_empty() {
        return vec![format!("No hourly data for {}", day.date)];
    }

    let mut lines = vec![format!("Temperature, {}", day.date)];
    lines.extend(chart::temperature_chart(&day.hour, TEMPERATURE_CHART_HEIGHT).to_lines());
    lines.push(format!("Chance of rain, {}", day.date));
    lines.extend(chart::precipitation_chart(&day.hour).to_lines());
    lines
}

pub fn alerts(alerts: &[Alert]) -> Vec<String> {
    if alerts.is_empty() {
        return vec!["No alerts.".to_string()];
    }
    alerts.iter().map(|a| format!("⚠ {}", a.message)).collect()
}

pub fn thresholds(t: &AlertThresholds) -> Vec<String> {
    vec![
        format!("High temperature: {:.1}°C", t.high_temp_c),
        format!("Low temperature:  {:.1}°C", t.low_temp_c),
        format!("Rain chance:      {:.0}%", t.rain_chance),
        format!("Wind speed:       {:.1} km/h", t.wind_kph),
    ]
}

/// Today's forecast day next to the historical one.
pub fn history_comparison(today: &WeatherData, past: &HistoricalData, units: Units) -> Vec<String> {
    let (Some(now), Some(then)) = (today.forecast.first_day(), past.day()) else {
        return vec!["Not enough data to compare.".to_string()];
    };

    vec![
        location_header(&past.location),
        format!("{:<14} {:>12} {:>12} {:>12}", "", now.date, then.date, "Difference"),
        format!(
            "{:<14} {:>12} {:>12} {:>12}",
            "Max temp",
            temp(units, now.day.max_temp_c),
            temp(units, then.day.max_temp_c),
            temp_delta(units, now.day.max_temp_c - then.day.max_temp_c),
        ),
        format!(
            "{:<14} {:>12} {:>12} {:>12}",
            "Min temp",
            temp(units, now.day.min_temp_c),
            temp(units, then.day.min_temp_c),
            temp_delta(units, now.day.min_temp_c - then.day.min_temp_c),
        ),
        format!(
            "{:<14} {:>9.1} mm {:>9.1} mm {:>+9.1} mm",
            "Precipitation",
            now.day.total_precip_mm,
            then.day.total_precip_mm,
            now.day.total_precip_mm - then.day.total_precip_mm,
        ),
        format!(
            "{:<14} {:>12} {:>12}",
            "Condition", now.day.condition.text, then.day.condition.text
        ),
    ]
}

fn percent_delta(delta: f64) -> String {
    format!("{delta:+.0}%")
}

fn wind_delta(units: Units, delta_kph: f64) -> String {
    match units {
        Units::Metric => format!("{delta_kph:+.1} km/h"),
        Units::Imperial => format!("{:+.1} mph", kmh_to_mph(delta_kph)),
    }
}

/// Two locations side by side, differences taken as first minus second.
pub fn location_comparison(first: &WeatherData, second: &WeatherData, units: Units) -> Vec<String> {
    let (a, b) = (&first.current, &second.current);
    let (name_a, name_b) = (&first.location.name, &second.location.name);
    let row = |label: &str, left: String, right: String, diff: String| {
        format!("{label:<15} {left:>18} {right:>18} {diff:>12}")
    };

    let mut lines = vec![
        format!("Location comparison: {name_a} vs {name_b}"),
        row("", name_a.clone(), name_b.clone(), "Difference".to_string()),
        row("Condition", a.condition.text.clone(), b.condition.text.clone(), "--".to_string()),
        row(
            "Temperature",
            temp(units, a.temp_c),
            temp(units, b.temp_c),
            temp_delta(units, a.temp_c - b.temp_c),
        ),
        row(
            "Feels like",
            temp(units, a.feels_like_c),
            temp(units, b.feels_like_c),
            temp_delta(units, a.feels_like_c - b.feels_like_c),
        ),
        row(
            "Humidity",
            format!("{}%", a.humidity),
            format!("{}%", b.humidity),
            percent_delta(f64::from(a.humidity) - f64::from(b.humidity)),
        ),
        row(
            "Wind",
            wind(units, a.wind_kph),
            wind(units, b.wind_kph),
            wind_delta(units, a.wind_kph - b.wind_kph),
        ),
        row("Wind direction", a.wind_dir.clone(), b.wind_dir.clone(), "--".to_string()),
        row(
            "Precipitation",
            format!("{:.1} mm", a.precip_mm),
            format!("{:.1} mm", b.precip_mm),
            "--".to_string(),
        ),
        row(
            "Local time",
            first.location.localtime.clone(),
            second.location.localtime.clone(),
            "--".to_string(),
        ),
    ];

    if let (Some(da), Some(db)) = (first.forecast.first_day(), second.forecast.first_day()) {
        lines.push(row(
            "Today max/min",
            format!("{}/{}", temp(units, da.day.max_temp_c), temp(units, da.day.min_temp_c)),
            format!("{}/{}", temp(units, db.day.max_temp_c), temp(units, db.day.min_temp_c)),
            temp_delta(units, da.day.max_temp_c - db.day.max_temp_c),
        ));
    }

    lines.extend(comparison_notes(first, second, units));
    lines
}

/// Plain-language notes for differences large enough to notice.
fn comparison_notes(first: &WeatherData, second: &WeatherData, units: Units) -> Vec<String> {
    let (a, b) = (&first.current, &second.current);
    let (name_a, name_b) = (&first.location.name, &second.location.name);
    let mut notes = Vec::new();

    let temp_diff = a.temp_c - b.temp_c;
    if temp_diff.abs() > 3.0 {
        let how = if temp_diff > 0.0 { "warmer" } else { "colder" };
        let by = temp_delta(units, temp_diff.abs());
        notes.push(format!("{name_a} is {} {how} than {name_b}", by.trim_start_matches('+')));
    }

    let humidity_diff = f64::from(a.humidity) - f64::from(b.humidity);
    if humidity_diff.abs() > 15.0 {
        let how = if humidity_diff > 0.0 { "more humid" } else { "drier" };
        notes.push(format!("{name_a} is {how} than {name_b}"));
    }

    let wind_diff = a.wind_kph - b.wind_kph;
    if wind_diff.abs() > 10.0 {
        let how = if wind_diff > 0.0 { "windier" } else { "calmer" };
        notes.push(format!("{name_a} is {how} than {name_b}"));
    }

    notes
}
