use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::track::TrackPoint;

const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// A display-ready row of the track point table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub time: Option<String>,
}

impl From<&TrackPoint> for PreviewRow {
    fn from(pt: &TrackPoint) -> Self {
        Self {
            latitude: round_to(pt.latitude, 6),
            longitude: round_to(pt.longitude, 6),
            elevation: pt.elevation.map(|e| round_to(e, 1)),
            time: pt.time.and_then(|t| t.format(TIME_FORMAT).ok()),
        }
    }
}

/// The first `limit` points, rounded for display.
pub fn preview_rows(points: &[TrackPoint], limit: usize) -> Vec<PreviewRow> {
    points.iter().take(limit).map(PreviewRow::from).collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
