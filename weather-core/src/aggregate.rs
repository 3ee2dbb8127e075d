//! Client-side daily aggregation for providers that only return raw samples.
//!
//! Samples are bucketed by their local calendar date in the order the provider
//! returned them, and each bucket becomes one [`ForecastDay`].

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::metrics::{clamp_percent, fraction_to_percent};
use crate::model::{Astro, Condition, Day, ForecastDay, Hour};

/// Condition categories counted as "rainy" when deriving a daily chance of rain.
const RAIN_CATEGORIES: [&str; 2] = ["Rain", "Drizzle"];

/// One provider sample, already converted to canonical units.
///
/// Forecast (3-hourly) and historical (hourly) items both land here right
/// after deserialization; nothing below this point knows which kind it was.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sample {
    pub epoch: i64,
    pub temp_c: f64,
    pub wind_kph: f64,
    pub precip_mm: f64,
    pub condition: Condition,
    /// Coarse provider category, e.g. `Rain`, `Clouds`.
    pub category: String,
    /// Probability of precipitation as a `[0,1]` fraction, when the provider has one.
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AverageRule {
    /// `(max + min) / 2`, used for the 3-hourly forecast list.
    Midrange,
    /// Arithmetic mean of every sample, used for hourly history.
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RainChanceRule {
    /// Share of samples whose category is rain or drizzle.
    ConditionFrequency,
    /// Source has no usable probability; always 0.
    Unavailable,
}

/// Sunrise/sunset epochs the provider reported, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct DailyAggregator {
    offset: FixedOffset,
    average: AverageRule,
    rain_chance: RainChanceRule,
    sun: Option<SunTimes>,
}

impl DailyAggregator {
    pub fn new(offset: FixedOffset, average: AverageRule, rain_chance: RainChanceRule) -> Self {
        Self {
            offset,
            average,
            rain_chance,
            sun: None,
        }
    }

    pub fn with_sun_times(mut self, sun: Option<SunTimes>) -> Self {
        self.sun = sun;
        self
    }

    /// Build at most `days` forecast days from `samples`.
    ///
    /// Dates are taken in first-seen order and are not re-sorted, so a provider
    /// returning samples out of order yields days out of order.
    pub fn aggregate(&self, samples: &[Sample], days: usize) -> Vec<ForecastDay> {
        let buckets = self.bucket_by_date(samples);

        let forecast: Vec<ForecastDay> = buckets
            .into_iter()
            .take(days)
            .map(|(date, bucket)| self.summarize(date, &bucket))
            .collect();

        tracing::debug!(
            samples = samples.len(),
            days = forecast.len(),
            "aggregated samples into forecast days"
        );

        forecast
    }

    /// The single day `date` (local to the aggregator's offset) built from the
    /// samples that fall on it, or `None` when none do.
    pub fn aggregate_date(&self, samples: &[Sample], date: NaiveDate) -> Option<ForecastDay> {
        let bucket: Vec<&Sample> = samples
            .iter()
            .filter(|s| local_time(s.epoch, self.offset).date_naive() == date)
            .collect();

        tracing::debug!(samples = samples.len(), kept = bucket.len(), %date, "aggregated one day");

        (!bucket.is_empty()).then(|| self.summarize(date, &bucket))
    }

    fn bucket_by_date<'a>(&self, samples: &'a [Sample]) -> Vec<(NaiveDate, Vec<&'a Sample>)> {
        let mut index: HashMap<NaiveDate, usize> = HashMap::new();
        let mut buckets: Vec<(NaiveDate, Vec<&Sample>)> = Vec::new();

        for sample in samples {
            let date = local_time(sample.epoch, self.offset).date_naive();
            match index.get(&date) {
                Some(&i) => buckets[i].1.push(sample),
                None => {
                    index.insert(date, buckets.len());
                    buckets.push((date, vec![sample]));
                }
            }
        }

        buckets
    }

    fn summarize(&self, date: NaiveDate, bucket: &[&Sample]) -> ForecastDay {
        let first = bucket[0];
        let (mut max_temp_c, mut min_temp_c) = (first.temp_c, first.temp_c);
        let mut max_wind_kph = first.wind_kph;
        let mut total_precip_mm = 0.0;
        let mut temp_sum = 0.0;
        let mut rainy = 0usize;

        for sample in bucket {
            max_temp_c = max_temp_c.max(sample.temp_c);
            min_temp_c = min_temp_c.min(sample.temp_c);
            max_wind_kph = max_wind_kph.max(sample.wind_kph);
            total_precip_mm += sample.precip_mm;
            temp_sum += sample.temp_c;
            if RAIN_CATEGORIES.contains(&sample.category.as_str()) {
                rainy += 1;
            }
        }

        let avg_temp_c = match self.average {
            AverageRule::Midrange => (max_temp_c + min_temp_c) / 2.0,
            AverageRule::Mean => temp_sum / bucket.len() as f64,
        };

        let daily_chance_of_rain = match self.rain_chance {
            RainChanceRule::ConditionFrequency => {
                clamp_percent((100.0 * rainy as f64 / bucket.len() as f64).round())
            }
            RainChanceRule::Unavailable => 0,
        };

        let midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp();

        ForecastDay {
            date: date.format("%Y-%m-%d").to_string(),
            date_epoch: midnight - i64::from(self.offset.local_minus_utc()),
            day: Day {
                max_temp_c,
                min_temp_c,
                avg_temp_c,
                max_wind_kph,
                total_precip_mm,
                daily_chance_of_rain,
                condition: modal_condition(bucket),
            },
            astro: self.astro_for(date),
            hour: bucket.iter().map(|s| self.to_hour(s)).collect(),
        }
    }

    fn to_hour(&self, sample: &Sample) -> Hour {
        let chance_of_rain = match self.rain_chance {
            RainChanceRule::ConditionFrequency => sample.pop.map(fraction_to_percent).unwrap_or(0),
            RainChanceRule::Unavailable => 0,
        };

        Hour {
            time_epoch: sample.epoch,
            time: format_local(sample.epoch, self.offset),
            temp_c: sample.temp_c,
            condition: sample.condition.clone(),
            chance_of_rain,
        }
    }

    fn astro_for(&self, date: NaiveDate) -> Astro {
        match self.sun {
            Some(sun) if local_time(sun.sunrise, self.offset).date_naive() == date => Astro {
                sunrise: format_clock(sun.sunrise, self.offset),
                sunset: format_clock(sun.sunset, self.offset),
            },
            _ => Astro::unavailable(),
        }
    }
}

/// Most frequent condition text in the bucket; ties go to whichever text was
/// seen first.
pub(crate) fn modal_condition(bucket: &[&Sample]) -> Condition {
    let mut counts: Vec<(&str, usize, &Condition)> = Vec::new();

    for sample in bucket {
        let text = sample.condition.text.as_str();
        match counts.iter_mut().find(|(t, _, _)| *t == text) {
            Some(entry) => entry.1 += 1,
            None => counts.push((text, 1, &sample.condition)),
        }
    }

    let mut best: Option<(usize, &Condition)> = None;
    for (_, count, condition) in counts {
        if best.is_none_or(|(top, _)| count > top) {
            best = Some((count, condition));
        }
    }

    best.map(|(_, c)| c.clone()).unwrap_or_default()
}

pub(crate) fn local_time(epoch: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// `YYYY-MM-DD HH:MM` in the given offset.
pub(crate) fn format_local(epoch: i64, offset: FixedOffset) -> String {
    local_time(epoch, offset).format("%Y-%m-%d %H:%M").to_string()
}

/// `06:42 AM` in the given offset.
pub(crate) fn format_clock(epoch: i64, offset: FixedOffset) -> String {
    local_time(epoch, offset).format("%I:%M %p").to_string()
}
