use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use time::Duration;
use tracing::debug;

use crate::geodesy::haversine_distance_m;
use crate::track::TrackPoint;

/// Trip statistics derived from a track point sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub total_distance_km: f64,
    pub total_points: usize,
    /// Present when at least one point carries an elevation.
    #[serde(flatten)]
    pub elevation: Option<ElevationSummary>,
    /// Present when at least two points carry a timestamp.
    #[serde(flatten)]
    pub duration: Option<ElapsedTime>,
}

impl StatisticsSummary {
    pub fn duration_text(&self) -> Option<String> {
        self.duration.map(|d| d.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationSummary {
    pub min_elevation_m: f64,
    pub max_elevation_m: f64,
    /// max - min, not cumulative ascent.
    pub elevation_gain_m: f64,
}

/// Elapsed time between the first and last timestamped points.
///
/// Displays as `[D day[s], ]H:MM:SS[.ffffff]`, e.g. `1 day, 2:03:04`.
/// Negative values keep a negative day count with a positive clock part
/// (`-1 day, 23:59:55` for minus five seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedTime(pub Duration);

impl ElapsedTime {
    pub fn duration(&self) -> Duration {
        self.0
    }
}

const MICROS_PER_DAY: i128 = 86_400_000_000;

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.0.whole_microseconds();
        let days = micros.div_euclid(MICROS_PER_DAY);
        let rem = micros.rem_euclid(MICROS_PER_DAY);

        let hours = rem / 3_600_000_000;
        let minutes = rem / 60_000_000 % 60;
        let seconds = rem / 1_000_000 % 60;
        let fraction = rem % 1_000_000;

        if days != 0 {
            let plural = if days.abs() == 1 { "" } else { "s" };
            write!(f, "{days} day{plural}, ")?;
        }
        write!(f, "{hours}:{minutes:02}:{seconds:02}")?;
        if fraction != 0 {
            write!(f, ".{fraction:06}")?;
        }
        Ok(())
    }
}

impl Serialize for ElapsedTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ElapsedTime", 2)?;
        state.serialize_field("durationSeconds", &self.0.as_seconds_f64())?;
        state.serialize_field("durationText", &self.to_string())?;
        state.end()
    }
}

/// Compute distance, elevation and duration statistics for a point sequence.
///
/// Distance is the sum of haversine distances between consecutive points.
/// Duration is the last timestamp minus the first, in sequence order, so
/// out-of-order timestamps are taken as recorded.
pub fn compute_statistics(points: &[TrackPoint]) -> StatisticsSummary {
    let total_distance_m: f64 = points
        .windows(2)
        .map(|pair| {
            haversine_distance_m(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            )
        })
        .sum();

    let elevation = points
        .iter()
        .filter_map(|p| p.elevation)
        .fold(None, |acc: Option<(f64, f64)>, ele| match acc {
            None => Some((ele, ele)),
            Some((min, max)) => Some((min.min(ele), max.max(ele))),
        })
        .map(|(min, max)| ElevationSummary {
            min_elevation_m: min,
            max_elevation_m: max,
            elevation_gain_m: max - min,
        });

    let mut times = points.iter().filter_map(|p| p.time);
    let duration = times.next().and_then(|first| {
        times
            .last()
            .map(|last| ElapsedTime(last - first))
    });

    let summary = StatisticsSummary {
        total_distance_km: total_distance_m / 1000.0,
        total_points: points.len(),
        elevation,
        duration,
    };
    debug!(
        distance_km = summary.total_distance_km,
        points = summary.total_points,
        has_elevation = summary.elevation.is_some(),
        has_duration = summary.duration.is_some(),
        "computed track statistics"
    );
    summary
}
