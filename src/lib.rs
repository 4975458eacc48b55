pub mod analysis;
pub mod error;
pub mod geodesy;
pub mod map;
pub mod options;
pub mod parser;
pub mod preview;
pub mod stats;
pub mod track;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::options::ViewerOptions;
use crate::track::TrackPoint;

pub use crate::analysis::{Analysis, analyze};
pub use crate::parser::parse_gpx;
pub use crate::stats::{StatisticsSummary, compute_statistics};

/// Parse GPX bytes into an array of track points, returned as a JS array.
#[wasm_bindgen(js_name = parseGpx)]
pub fn parse_gpx_js(bytes: &[u8]) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let points = parser::parse_gpx(bytes)?;
    to_js(&points)
}

/// Compute statistics for an array of track points previously returned by `parseGpx`.
#[wasm_bindgen(js_name = computeStatistics)]
pub fn compute_statistics_js(points: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let points: Vec<TrackPoint> =
        serde_wasm_bindgen::from_value(points).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&stats::compute_statistics(&points))
}

/// Parse GPX bytes and build statistics, map and preview, returned as a JS object.
#[wasm_bindgen(js_name = analyzeGpx)]
pub fn analyze_gpx(bytes: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let result = analysis::analyze(bytes, &opts)?;
    to_js(&result)
}

/// Parse GPX bytes and build statistics, map and preview, returned as a JSON string.
#[wasm_bindgen(js_name = analyzeGpxString)]
pub fn analyze_gpx_string(bytes: &[u8], options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let result = analysis::analyze(bytes, &opts)?;
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_options(options: JsValue) -> Result<ViewerOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ViewerOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
