use serde_json::{Value, json};
use weather_core::{
    Units, WeatherError, fetch_historical_weather_with, fetch_weather_with,
    provider::openweather::OpenWeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// 2024-06-01 00:00:00 UTC
const DAY_ONE: i64 = 1_717_200_000;
const HOUR: i64 = 3_600;

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_urls(
        "OW_KEY".to_string(),
        Units::Metric,
        format!("{}/data/2.5", server.uri()),
        format!("{}/geo/1.0/direct", server.uri()),
    )
}

async fn mount_berlin(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Berlin"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", "OW_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Berlin", "lat": 52.52, "lon": 13.405, "country": "DE"}
        ])))
        .mount(server)
        .await;
}

fn forecast_item(dt: i64, temp: f64, main: &str, description: &str, pop: f64) -> Value {
    json!({
        "dt": dt,
        "main": {"temp": temp, "feels_like": temp, "pressure": 1012.0, "humidity": 60},
        "weather": [{"id": 800, "main": main, "description": description, "icon": "01d"}],
        "wind": {"speed": 5.0, "deg": 90.0},
        "pop": pop
    })
}

#[tokio::test]
async fn forecast_flow_geocodes_then_aggregates_daily() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "52.52"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "OW_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dt": DAY_ONE + 12 * HOUR,
            "main": {"temp": 20.0, "feels_like": 19.0, "pressure": 1015.0, "humidity": 55},
            "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}],
            "wind": {"speed": 10.0, "deg": 90.0},
            "visibility": 10000.0,
            "rain": {"1h": 0.4},
            "sys": {"sunrise": DAY_ONE + 4 * HOUR, "sunset": DAY_ONE + 19 * HOUR},
            "timezone": 0
        })))
        .mount(&server)
        .await;

    let mut list = Vec::new();
    let temps = [10.0, 12.0, 15.0, 14.0, 13.0, 11.0, 9.0, 8.0];
    for (i, temp) in temps.iter().enumerate() {
        let (main, description) = if i < 2 {
            ("Rain", "light rain")
        } else {
            ("Clear", "clear sky")
        };
        list.push(forecast_item(DAY_ONE + i as i64 * 3 * HOUR, *temp, main, description, 0.5));
    }
    for i in 0..8 {
        list.push(forecast_item(DAY_ONE + 86_400 + i * 3 * HOUR, 20.0, "Clear", "clear sky", 0.0));
    }

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "52.52"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "city": {"name": "Berlin", "country": "DE", "timezone": 0,
                     "sunrise": DAY_ONE + 4 * HOUR, "sunset": DAY_ONE + 19 * HOUR},
            "list": list
        })))
        .mount(&server)
        .await;

    let data = fetch_weather_with(&provider(&server), "Berlin", 5)
        .await
        .expect("forecast");

    assert_eq!(data.location.name, "Berlin");
    assert_eq!(data.location.country, "DE");
    assert_eq!(data.current.condition.text, "Few clouds");
    assert_eq!(data.current.wind_dir, "E");
    assert!((data.current.wind_kph - 36.0).abs() < 1e-9);
    assert!((data.current.vis_km - 10.0).abs() < 1e-9);
    assert!((data.current.precip_mm - 0.4).abs() < 1e-9);

    let days = &data.forecast.forecast_day;
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date, "2024-06-01");
    assert_eq!(days[0].date_epoch, DAY_ONE);
    assert_eq!(days[0].day.max_temp_c, 15.0);
    assert_eq!(days[0].day.min_temp_c, 8.0);
    assert!((days[0].day.avg_temp_c - 11.5).abs() < 1e-9);
    assert_eq!(days[0].day.daily_chance_of_rain, 25);
    assert_eq!(days[0].day.condition.text, "Clear sky");
    assert_eq!(days[0].hour.len(), 8);
    assert_eq!(days[0].hour[0].chance_of_rain, 50);
    assert_eq!(days[1].day.daily_chance_of_rain, 0);
}

#[tokio::test]
async fn unknown_place_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Nowhereville"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = fetch_weather_with(&provider(&server), "Nowhereville", 3)
        .await
        .unwrap_err();

    match err {
        WeatherError::NotFound(place) => assert_eq!(place, "Nowhereville"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn history_uses_midnight_utc_and_averages_hourly_samples() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;

    let hourly: Vec<Value> = (0..24)
        .map(|h| {
            json!({
                "dt": DAY_ONE + h * HOUR,
                "temp": if h < 12 { 10.0 } else { 20.0 },
                "wind_speed": 2.0,
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/data/2.5/onecall/timemachine"))
        .and(query_param("dt", DAY_ONE.to_string()))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lat": 52.52, "lon": 13.405,
            "timezone": "Europe/Berlin", "timezone_offset": 0,
            "current": {"dt": DAY_ONE, "sunrise": DAY_ONE + 3 * HOUR, "sunset": DAY_ONE + 19 * HOUR},
            "hourly": hourly
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hist = fetch_historical_weather_with(&provider(&server), "Berlin", "2024-06-01")
        .await
        .expect("history");

    assert_eq!(hist.location.tz_id, "Europe/Berlin");
    let day = hist.day().expect("one day");
    assert_eq!(hist.forecast.forecast_day.len(), 1);
    assert_eq!(day.date, "2024-06-01");
    assert!((day.day.avg_temp_c - 15.0).abs() < 1e-9);
    assert_eq!(day.day.daily_chance_of_rain, 0);
    assert_eq!(day.hour.len(), 24);
}

#[tokio::test]
async fn empty_history_is_a_decode_error() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/onecall/timemachine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone_offset": 0,
            "current": {"dt": DAY_ONE},
            "hourly": []
        })))
        .mount(&server)
        .await;

    let err = fetch_historical_weather_with(&provider(&server), "Berlin", "2024-06-01")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::Decode { .. }));
}

#[tokio::test]
async fn subscription_error_surfaces_status() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/onecall/timemachine"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = fetch_historical_weather_with(&provider(&server), "Berlin", "2024-06-01")
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert!(err.to_string().contains("Invalid API key"));
}

async fn mount_current(server: &MockServer, timezone: i32) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dt": DAY_ONE + 12 * HOUR,
            "main": {"temp": 20.0, "pressure": 1015.0, "humidity": 55},
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "wind": {"speed": 1.0, "deg": 0.0},
            "timezone": timezone
        })))
        .mount(server)
        .await;
}

/// Sixteen 3-hour items starting at 2024-06-01 00:00 UTC.
async fn mount_forecast(server: &MockServer, timezone: i32) {
    let list: Vec<Value> = (0..16)
        .map(|i| forecast_item(DAY_ONE + i * 3 * HOUR, 10.0 + i as f64, "Clear", "clear sky", 0.0))
        .collect();

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "city": {"name": "Berlin", "country": "DE", "timezone": timezone},
            "list": list
        })))
        .mount(server)
        .await;
}

fn dates_and_hours(days: &[weather_core::model::ForecastDay]) -> (Vec<&str>, Vec<usize>) {
    days.iter().map(|d| (d.date.as_str(), d.hour.len())).unzip()
}

#[tokio::test]
async fn forecast_west_of_utc_buckets_by_local_date() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;
    mount_current(&server, -14_400).await;
    mount_forecast(&server, -14_400).await;

    let data = fetch_weather_with(&provider(&server), "Berlin", 5)
        .await
        .expect("forecast");

    let (dates, hours) = dates_and_hours(&data.forecast.forecast_day);
    assert_eq!(dates, ["2024-05-31", "2024-06-01", "2024-06-02"]);
    assert_eq!(hours, [2, 8, 6]);
    assert_eq!(data.forecast.forecast_day[1].date_epoch, DAY_ONE + 4 * HOUR);
    assert_eq!(data.forecast.forecast_day[1].hour[0].time, "2024-06-01 02:00");
    assert_eq!(data.location.tz_id, "UTC-04:00");
    assert_eq!(data.location.localtime, "2024-06-01 08:00");

    let two = fetch_weather_with(&provider(&server), "Berlin", 2)
        .await
        .expect("forecast");
    let (dates, _) = dates_and_hours(&two.forecast.forecast_day);
    assert_eq!(dates, ["2024-05-31", "2024-06-01"]);
}

#[tokio::test]
async fn forecast_east_of_utc_buckets_by_local_date() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;
    mount_current(&server, 10_800).await;
    mount_forecast(&server, 10_800).await;

    let data = fetch_weather_with(&provider(&server), "Berlin", 5)
        .await
        .expect("forecast");

    let (dates, hours) = dates_and_hours(&data.forecast.forecast_day);
    assert_eq!(dates, ["2024-06-01", "2024-06-02", "2024-06-03"]);
    assert_eq!(hours, [7, 8, 1]);
    assert_eq!(data.forecast.forecast_day[0].hour[0].time, "2024-06-01 03:00");
    assert_eq!(data.forecast.forecast_day[2].date_epoch, DAY_ONE + 2 * 86_400 - 3 * HOUR);
}

async fn mount_time_machine(server: &MockServer, dt: i64, offset: i32) {
    let hourly: Vec<Value> = (0..24)
        .map(|h| {
            json!({
                "dt": dt + h * HOUR,
                "temp": 10.0,
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/data/2.5/onecall/timemachine"))
        .and(query_param("dt", dt.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone_offset": offset,
            "current": {"dt": dt},
            "hourly": hourly
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn history_west_of_utc_returns_the_requested_local_day() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;
    mount_time_machine(&server, DAY_ONE, -14_400).await;
    mount_time_machine(&server, DAY_ONE + 86_400, -14_400).await;

    let hist = fetch_historical_weather_with(&provider(&server), "Berlin", "2024-06-01")
        .await
        .expect("history");

    let day = hist.day().expect("one day");
    assert_eq!(hist.forecast.forecast_day.len(), 1);
    assert_eq!(day.date, "2024-06-01");
    assert_eq!(day.hour.len(), 24);
    assert_eq!(day.hour[0].time, "2024-06-01 00:00");
    assert_eq!(day.hour[23].time, "2024-06-01 23:00");
}

#[tokio::test]
async fn history_east_of_utc_returns_the_requested_local_day() {
    let server = MockServer::start().await;
    mount_berlin(&server).await;
    mount_time_machine(&server, DAY_ONE, 7_200).await;
    mount_time_machine(&server, DAY_ONE - 86_400, 7_200).await;

    let hist = fetch_historical_weather_with(&provider(&server), "Berlin", "2024-06-01")
        .await
        .expect("history");

    let day = hist.day().expect("one day");
    assert_eq!(day.date, "2024-06-01");
    assert_eq!(day.date_epoch, DAY_ONE - 2 * HOUR);
    assert_eq!(day.hour.len(), 24);
    assert_eq!(day.hour[0].time_epoch, DAY_ONE - 2 * HOUR);
}
