//! Fixed-size terminal charts over canonical hourly data.
//!
//! [`render`] maps a labelled series onto a grid of glyph rows; the
//! `*_chart` helpers pick the series out of a day's hours and the scale that
//! suits it.

use chrono::{DateTime, NaiveDateTime, Timelike};

use crate::model::Hour;

/// Default height of the temperature chart, in rows above the baseline.
pub const TEMPERATURE_CHART_HEIGHT: usize = 10;
/// Fixed percentage levels for precipitation bars, top to bottom.
pub const PRECIPITATION_LEVELS: [u8; 6] = [100, 80, 60, 40, 20, 0];

const MAX_POINTS: usize = 8;
const LABEL_EVERY_SECS: i64 = 3 * 3600;
const COLUMN_WIDTH: usize = 11;

const GLYPH_AT: char = '•';
const GLYPH_ABOVE: char = '│';
const GLYPH_BLANK: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartScale {
    /// Min/max of the series, padded, mapped linearly onto `0..=height`.
    Linear {
        height: usize,
        padding: f64,
        unit: &'static str,
    },
    /// Fixed percentage levels with shading by value.
    Percent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub cells: Vec<char>,
    /// Axis annotation printed to the right of the row, if any.
    pub scale: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub labels: Vec<String>,
    pub rows: Vec<ChartRow>,
}

impl Chart {
    /// Framed text lines, one column of `COLUMN_WIDTH` per series point.
    pub fn to_lines(&self) -> Vec<String> {
        if self.labels.is_empty() {
            return Vec::new();
        }

        let width = COLUMN_WIDTH * self.labels.len();
        let mut lines = Vec::with_capacity(self.rows.len() + 3);

        lines.push(format!("┌{}┐", "─".repeat(width)));

        let header: String = self.labels.iter().map(|l| centered(l, COLUMN_WIDTH)).collect();
        lines.push(format!("│{header}│"));

        for row in &self.rows {
            let body: String = row
                .cells
                .iter()
                .map(|c| centered(&c.to_string(), COLUMN_WIDTH))
                .collect();
            match &row.scale {
                Some(scale) => lines.push(format!("│{body}│ {scale}")),
                None => lines.push(format!("│{body}│")),
            }
        }

        lines.push(format!("└{}┘", "─".repeat(width)));
        lines
    }
}

/// Render `series` as rows from the top of the scale down to its baseline.
pub fn render(series: &[(String, f64)], scale: ChartScale) -> Chart {
    let labels = series.iter().map(|(label, _)| label.clone()).collect();

    if series.is_empty() {
        return Chart {
            labels,
            rows: Vec::new(),
        };
    }

    let rows = match scale {
        ChartScale::Linear {
            height,
            padding,
            unit,
        } => linear_rows(series, height, padding, unit),
        ChartScale::Percent => percent_rows(series),
    };

    Chart { labels, rows }
}

fn linear_rows(series: &[(String, f64)], height: usize, padding: f64, unit: &str) -> Vec<ChartRow> {
    let (mut min, mut max) = (series[0].1, series[0].1);
    for (_, v) in series {
        min = min.min(*v);
        max = max.max(*v);
    }
    min -= padding;
    max += padding;

    let span = if max > min { max - min } else { 1.0 };
    let buckets: Vec<usize> = series
        .iter()
        .map(|(_, v)| {
            let scaled = ((v - min) * height as f64 / span).floor();
            (scaled.max(0.0) as usize).min(height)
        })
        .collect();

    (0..=height)
        .rev()
        .map(|row| {
            let cells = buckets
                .iter()
                .map(|&bucket| match bucket.cmp(&row) {
                    std::cmp::Ordering::Equal => GLYPH_AT,
                    std::cmp::Ordering::Greater => GLYPH_ABOVE,
                    std::cmp::Ordering::Less => GLYPH_BLANK,
                })
                .collect();

            let scale = if row == height {
                Some(format!("{max:.1}{unit}"))
            } else if row == 0 {
                Some(format!("{min:.1}{unit}"))
            } else if row == height / 2 {
                Some(format!("{:.1}{unit}", (max + min) / 2.0))
            } else {
                None
            };

            ChartRow { cells, scale }
        })
        .collect()
}

fn percent_rows(series: &[(String, f64)]) -> Vec<ChartRow> {
    let last = PRECIPITATION_LEVELS.len() - 1;

    PRECIPITATION_LEVELS
        .iter()
        .enumerate()
        .map(|(i, &level)| {
            let cells = series
                .iter()
                .map(|(_, chance)| {
                    if *chance >= f64::from(level) {
                        shade(*chance)
                    } else {
                        GLYPH_BLANK
                    }
                })
                .collect();

            let scale = match i {
                0 => Some("100%".to_string()),
                i if i == last => Some("0%".to_string()),
                i if i == PRECIPITATION_LEVELS.len() / 2 => Some("50%".to_string()),
                _ => None,
            };

            ChartRow { cells, scale }
        })
        .collect()
}

/// Shading tier for a precipitation percentage.
pub fn shade(chance: f64) -> char {
    match chance {
        c if c >= 80.0 => '█',
        c if c >= 60.0 => '▓',
        c if c >= 40.0 => '▒',
        c if c >= 20.0 => '░',
        _ => '·',
    }
}

/// Temperature trend over `hours`, sampled every three hours.
pub fn temperature_chart(hours: &[Hour], height: usize) -> Chart {
    let series = sample_hours(hours, |h| h.temp_c);
    render(
        &series,
        ChartScale::Linear {
            height,
            padding: 1.0,
            unit: "°C",
        },
    )
}

/// Chance-of-rain bars over `hours`, sampled every three hours.
pub fn precipitation_chart(hours: &[Hour]) -> Chart {
    let series = sample_hours(hours, |h| f64::from(h.chance_of_rain));
    render(&series, ChartScale::Percent)
}

/// Pick at most `MAX_POINTS` hours spaced roughly three hours apart and label
/// them by hour of day.
///
/// Hourly data is strided by three; data already in 3-hour steps is taken as is.
pub fn sample_hours(hours: &[Hour], value: impl Fn(&Hour) -> f64) -> Vec<(String, f64)> {
    let step = match hours {
        [a, b, ..] if b.time_epoch > a.time_epoch => {
            (LABEL_EVERY_SECS / (b.time_epoch - a.time_epoch)).max(1) as usize
        }
        _ => 1,
    };

    hours
        .iter()
        .step_by(step)
        .take(MAX_POINTS)
        .map(|h| (hour_label(h), value(h)))
        .collect()
}

fn hour_label(hour: &Hour) -> String {
    let h = NaiveDateTime::parse_from_str(&hour.time, "%Y-%m-%d %H:%M")
        .map(|t| t.hour())
        .unwrap_or_else(|_| {
            DateTime::from_timestamp(hour.time_epoch, 0)
                .map(|t| t.hour())
                .unwrap_or(0)
        });
    format!("{h:02}:00")
}

fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let padding = width.saturating_sub(len);
    let left = padding / 2;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(padding - left))
}
