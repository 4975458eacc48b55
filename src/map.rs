use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::options::ViewerOptions;
use crate::track::TrackPoint;

/// Everything the map page needs to draw a track: where to center, the
/// initial zoom, and the route line with start/end markers as GeoJSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMap {
    pub center: MapCenter,
    pub zoom: u8,
    pub features: FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// Build the map payload, or `None` for an empty sequence.
pub fn route_map(points: &[TrackPoint], opts: &ViewerOptions) -> Option<RouteMap> {
    let (first, last) = (points.first()?, points.last()?);

    let n = points.len() as f64;
    let center = MapCenter {
        latitude: points.iter().map(|p| p.latitude).sum::<f64>() / n,
        longitude: points.iter().map(|p| p.longitude).sum::<f64>() / n,
    };

    let mut features = Vec::with_capacity(3);
    if points.len() >= 2 {
        features.push(route_feature(points, opts));
    }
    features.push(marker_feature(first, "start", &opts.start_label, opts));
    features.push(marker_feature(last, "end", &opts.end_label, opts));

    Some(RouteMap {
        center,
        zoom: opts.zoom,
        features: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
    })
}

fn route_feature(points: &[TrackPoint], opts: &ViewerOptions) -> Feature {
    let coords: Vec<Vec<f64>> = points
        .iter()
        .map(|pt| point_coords(pt, opts.include_elevation))
        .collect();

    let mut props = Map::new();
    props.insert("role".to_string(), JsonValue::String("route".to_string()));
    insert_coordinate_times(&mut props, points);

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords))),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn marker_feature(pt: &TrackPoint, role: &str, label: &str, opts: &ViewerOptions) -> Feature {
    let geometry = Geometry::new(Value::Point(point_coords(pt, opts.include_elevation)));

    let mut props = Map::new();
    props.insert("role".to_string(), JsonValue::String(role.to_string()));
    props.insert("label".to_string(), JsonValue::String(label.to_string()));

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Build [lon, lat] or [lon, lat, ele] coordinate array.
fn point_coords(pt: &TrackPoint, include_elevation: bool) -> Vec<f64> {
    match (include_elevation, pt.elevation) {
        (true, Some(ele)) => vec![pt.longitude, pt.latitude, ele],
        _ => vec![pt.longitude, pt.latitude],
    }
}

fn insert_coordinate_times(props: &mut Map<String, JsonValue>, points: &[TrackPoint]) {
    let times: Vec<JsonValue> = points
        .iter()
        .map(|pt| {
            pt.time
                .and_then(|t| {
                    t.format(&time::format_description::well_known::Rfc3339)
                        .ok()
                })
                .map_or(JsonValue::Null, JsonValue::String)
        })
        .collect();

    if times.iter().any(|t| !t.is_null()) {
        let mut coord_props = Map::new();
        coord_props.insert("times".to_string(), JsonValue::Array(times));
        props.insert(
            "coordinateProperties".to_string(),
            JsonValue::Object(coord_props),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn roles(map: &RouteMap) -> Vec<&str> {
        map.features
            .features
            .iter()
            .map(|f| f.properties.as_ref().unwrap()["role"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_empty_has_no_map() {
        assert!(route_map(&[], &ViewerOptions::default()).is_none());
    }

    #[test]
    fn test_route_with_markers() {
        let points = [
            TrackPoint::new(35.0, 139.0).with_elevation(10.0),
            TrackPoint::new(35.001, 139.001),
            TrackPoint::new(35.002, 139.005).with_elevation(12.0),
        ];
        let map = route_map(&points, &ViewerOptions::default()).unwrap();
        assert_eq!(roles(&map), vec!["route", "start", "end"]);
        assert_eq!(map.zoom, 13);
        assert!((map.center.latitude - 35.001).abs() < 1e-10);
        assert!((map.center.longitude - 139.002).abs() < 1e-10);

        let route = map.features.features[0].geometry.as_ref().unwrap();
        if let Value::LineString(coords) = &route.value {
            assert_eq!(coords.len(), 3);
            // Check [lon, lat, ele] order
            assert_eq!(coords[0], vec![139.0, 35.0, 10.0]);
            assert_eq!(coords[1], vec![139.001, 35.001]);
        } else {
            panic!("Expected LineString");
        }

        let end = &map.features.features[2];
        assert_eq!(end.properties.as_ref().unwrap()["label"], "Finish");
        if let Value::Point(coords) = &end.geometry.as_ref().unwrap().value {
            assert_eq!(coords, &vec![139.005, 35.002, 12.0]);
        } else {
            panic!("Expected Point");
        }
    }

    #[test]
    fn test_single_point_has_markers_only() {
        let map = route_map(&[TrackPoint::new(1.0, 2.0)], &ViewerOptions::default()).unwrap();
        assert_eq!(roles(&map), vec!["start", "end"]);
    }

    #[test]
    fn test_options_applied() {
        let points = [
            TrackPoint::new(0.0, 0.0).with_elevation(5.0),
            TrackPoint::new(0.0, 1.0).with_elevation(6.0),
        ];
        let opts = ViewerOptions {
            include_elevation: false,
            zoom: 9,
            start_label: "Depart".to_string(),
            ..Default::default()
        };
        let map = route_map(&points, &opts).unwrap();
        assert_eq!(map.zoom, 9);
        let start = &map.features.features[1];
        assert_eq!(start.properties.as_ref().unwrap()["label"], "Depart");
        if let Value::Point(coords) = &start.geometry.as_ref().unwrap().value {
            assert_eq!(coords.len(), 2); // No elevation
        }
    }

    #[test]
    fn test_route_times() {
        let points = [
            TrackPoint::new(0.0, 0.0).with_time(datetime!(2025-01-01 6:00 UTC)),
            TrackPoint::new(0.0, 1.0),
        ];
        let map = route_map(&points, &ViewerOptions::default()).unwrap();
        let props = map.features.features[0].properties.as_ref().unwrap();
        let times = props["coordinateProperties"]["times"].as_array().unwrap();
        assert_eq!(times[0], "2025-01-01T06:00:00Z");
        assert!(times[1].is_null());

        let untimed = [TrackPoint::new(0.0, 0.0), TrackPoint::new(0.0, 1.0)];
        let map = route_map(&untimed, &ViewerOptions::default()).unwrap();
        let props = map.features.features[0].properties.as_ref().unwrap();
        assert!(!props.contains_key("coordinateProperties"));
    }
}
