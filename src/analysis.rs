use serde::Serialize;

use crate::error::GpxViewerError;
use crate::map::{RouteMap, route_map};
use crate::options::ViewerOptions;
use crate::parser::parse_gpx;
use crate::preview::{PreviewRow, preview_rows};
use crate::stats::{StatisticsSummary, compute_statistics};

/// Everything the viewer page renders for one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub statistics: StatisticsSummary,
    pub map: RouteMap,
    pub preview: Vec<PreviewRow>,
}

/// Parse a GPX document and derive statistics, map and preview table.
///
/// Unlike [`parse_gpx`], a document without track points is an error here
/// ([`GpxViewerError::EmptyTrackData`]).
pub fn analyze(bytes: &[u8], opts: &ViewerOptions) -> Result<Analysis, GpxViewerError> {
    let points = parse_gpx(bytes)?;
    if points.is_empty() {
        return Err(GpxViewerError::EmptyTrackData);
    }
    let map = route_map(&points, opts).ok_or(GpxViewerError::EmptyTrackData)?;

    Ok(Analysis {
        statistics: compute_statistics(&points),
        map,
        preview: preview_rows(&points, opts.preview_rows),
    })
}
