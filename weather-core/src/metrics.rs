//! Unit conversions and small derived values shared by the adapters.

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const KMH_PER_MPH: f64 = 1.609_344;

/// Bucket a bearing into one of 16 compass points, 22.5° each, centred on N.
pub fn compass_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 11.25) / 22.5).floor() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * 3.6
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * KMH_PER_MPH
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / KMH_PER_MPH
}

pub fn meters_to_km(meters: f64) -> f64 {
    meters / 1000.0
}

/// Rain volume wins over snow volume; neither means no precipitation.
pub fn precipitation_mm(rain: Option<f64>, snow: Option<f64>) -> f64 {
    rain.or(snow).unwrap_or(0.0)
}

/// Round a `[0,1]` probability into a `[0,100]` percentage.
pub fn fraction_to_percent(fraction: f64) -> u8 {
    clamp_percent((fraction * 100.0).round())
}

pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn compass_cardinal_points() {
        assert_eq!(compass_direction(0.0), "N");
        assert_eq!(compass_direction(90.0), "E");
        assert_eq!(compass_direction(180.0), "S");
        assert_eq!(compass_direction(270.0), "W");
    }

    #[test]
    fn compass_wraps_back_to_north() {
        assert_eq!(compass_direction(348.75), "N");
        assert_eq!(compass_direction(348.74), "NNW");
        assert_eq!(compass_direction(11.24), "N");
        assert_eq!(compass_direction(11.25), "NNE");
    }

    #[test]
    fn compass_visits_every_label_once_per_rotation() {
        let labels: Vec<_> = (0..16).map(|i| compass_direction(i as f64 * 22.5)).collect();
        assert_eq!(labels, COMPASS_POINTS.to_vec());
    }

    #[test]
    fn wind_speed_conversion() {
        assert!((mps_to_kmh(5.0) - 18.0).abs() < 1e-9);
        assert!((mph_to_kmh(10.0) - 16.093_44).abs() < 1e-9);
        assert!((kmh_to_mph(mph_to_kmh(12.5)) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn temperature_conversion() {
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
    }

    #[test]
    fn visibility_in_km() {
        assert_eq!(meters_to_km(10_000.0), 10.0);
    }

    #[test]
    fn rain_preferred_over_snow() {
        assert_eq!(precipitation_mm(Some(1.5), Some(3.0)), 1.5);
        assert_eq!(precipitation_mm(None, Some(3.0)), 3.0);
        assert_eq!(precipitation_mm(None, None), 0.0);
    }

    #[test]
    fn percentages_are_clamped() {
        assert_eq!(fraction_to_percent(0.456), 46);
        assert_eq!(fraction_to_percent(1.7), 100);
        assert_eq!(fraction_to_percent(-0.2), 0);
        assert_eq!(clamp_percent(f64::NAN), 0);
    }

    proptest! {
        #[test]
        fn compass_is_periodic(tenths in 0u32..3600, turns in -3i32..3) {
            let d = f64::from(tenths) / 10.0;
            let shifted = d + 360.0 * f64::from(turns);
            prop_assert_eq!(compass_direction(d), compass_direction(shifted));
        }

        #[test]
        fn fahrenheit_mirror_is_affine(c in -90.0f64..60.0) {
            prop_assert!((fahrenheit_to_celsius(celsius_to_fahrenheit(c)) - c).abs() < 1e-9);
        }

        #[test]
        fn percent_always_in_range(f in -10.0f64..10.0) {
            prop_assert!(fraction_to_percent(f) <= 100);
        }
    }
}
