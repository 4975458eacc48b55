//! Browser-boundary tests. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use gpx_viewer_wasm::{analyze_gpx, analyze_gpx_string, compute_statistics_js, parse_gpx_js};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const TRACK: &[u8] = br#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg>
    <trkpt lat="0.0" lon="0.0"><ele>10</ele><time>2025-01-01T00:00:00Z</time></trkpt>
    <trkpt lat="0.0" lon="1.0"><ele>30</ele><time>2025-01-01T01:00:00Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

fn get(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn parse_then_compute() {
    let points = parse_gpx_js(TRACK).unwrap();
    assert_eq!(js_sys::Array::from(&points).length(), 2);

    let stats = compute_statistics_js(points).unwrap();
    assert_eq!(get(&stats, "totalPoints").as_f64(), Some(2.0));
    assert_eq!(get(&stats, "durationText").as_string().as_deref(), Some("1:00:00"));
    let km = get(&stats, "totalDistanceKm").as_f64().unwrap();
    assert!((km - 111.19).abs() < 0.01);
}

#[wasm_bindgen_test]
fn analyze_with_options() {
    let options = js_sys::JSON::parse(r#"{"previewRows": 1}"#).unwrap();
    let result = analyze_gpx(TRACK, options).unwrap();
    assert_eq!(js_sys::Array::from(&get(&result, "preview")).length(), 1);
    assert_eq!(get(&get(&result, "map"), "zoom").as_f64(), Some(13.0));

    let json = analyze_gpx_string(TRACK, JsValue::UNDEFINED).unwrap();
    assert!(json.contains("\"elevationGainM\":20.0"));
}

#[wasm_bindgen_test]
fn errors_carry_kind() {
    let err = analyze_gpx(b"<gpx></gpx>", JsValue::NULL).unwrap_err();
    let err: js_sys::Error = err.dyn_into().unwrap();
    assert_eq!(String::from(err.name()), "EmptyTrackData");

    let err = parse_gpx_js(b"<gpx><trk><trkseg><trkpt lat=\"x\" lon=\"1\"/></trkseg></trk></gpx>")
        .unwrap_err();
    let err: js_sys::Error = err.dyn_into().unwrap();
    assert_eq!(String::from(err.name()), "MalformedDocument");
    assert!(String::from(err.message()).contains("'x'"));
}
