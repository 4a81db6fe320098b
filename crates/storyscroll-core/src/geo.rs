//! Markers, route segments, and the map helpers built on them.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_WAYPOINT_STEPS: usize = 20;
pub const DEFAULT_ARC_HEIGHT: f64 = 0.3;
pub const DEFAULT_ARC_STEPS: usize = 30;

/// `[longitude, latitude]`
pub type LngLat = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    City,
    Landmark,
    Cultural,
    #[default]
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "coords")]
    pub coordinates: LngLat,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: MarkerKind,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Flight,
    Train,
    Car,
    Boat,
    Walking,
    #[default]
    Custom,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Train => "train",
            Self::Car => "car",
            Self::Boat => "boat",
            Self::Walking => "walking",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    #[serde(default)]
    pub id: Option<String>,
    pub from: LngLat,
    pub to: LngLat,
    #[serde(default, alias = "type")]
    pub kind: RouteKind,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub dashed: bool,
    #[serde(default)]
    pub animated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub center: LngLat,
    pub zoom: f64,
    /// `[south_west, north_east]`
    pub bounds: [LngLat; 2],
}

impl MapBounds {
    pub fn world() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 2.0,
            bounds: [[-180.0, -90.0], [180.0, 90.0]],
        }
    }
}

/// Box around every marker, with a coarse zoom picked from the widest span.
pub fn calculate_map_bounds(markers: &[Marker]) -> MapBounds {
    if markers.is_empty() {
        return MapBounds::world();
    }

    let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for marker in markers {
        let [lng, lat] = marker.coordinates;
        min_lng = min_lng.min(lng);
        max_lng = max_lng.max(lng);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }

    let max_span = (max_lng - min_lng).max(max_lat - min_lat);
    MapBounds {
        center: [(min_lng + max_lng) / 2.0, (min_lat + max_lat) / 2.0],
        zoom: zoom_for_span(max_span),
        bounds: [[min_lng, min_lat], [max_lng, max_lat]],
    }
}

fn zoom_for_span(span: f64) -> f64 {
    match span {
        s if s < 0.01 => 16.0,
        s if s < 0.1 => 12.0,
        s if s < 1.0 => 8.0,
        s if s < 10.0 => 6.0,
        s if s < 50.0 => 4.0,
        _ => 2.0,
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(from: LngLat, to: LngLat) -> f64 {
    let d_lat = (to[1] - from[1]).to_radians();
    let d_lon = (to[0] - from[0]).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from[1].to_radians().cos() * to[1].to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn route_distance_km(segments: &[RouteSegment]) -> f64 {
    segments
        .iter()
        .map(|segment| haversine_km(segment.from, segment.to))
        .sum()
}

/// First marker at the minimum distance wins.
pub fn find_nearest_marker(coord: LngLat, markers: &[Marker]) -> Option<&Marker> {
    let mut nearest: Option<(&Marker, f64)> = None;
    for marker in markers {
        let distance = haversine_km(coord, marker.coordinates);
        match nearest {
            Some((_, best)) if best <= distance => {}
            _ => nearest = Some((marker, distance)),
        }
    }
    nearest.map(|(marker, _)| marker)
}

pub fn group_markers_by_kind(markers: &[Marker]) -> BTreeMap<MarkerKind, Vec<&Marker>> {
    let mut groups: BTreeMap<MarkerKind, Vec<&Marker>> = BTreeMap::new();
    for marker in markers {
        groups.entry(marker.kind).or_default().push(marker);
    }
    groups
}

/// `steps + 1` evenly spaced points from `from` to `to`, both ends included.
pub fn generate_waypoints(from: LngLat, to: LngLat, steps: usize) -> Vec<LngLat> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            [
                from[0] + (to[0] - from[0]) * t,
                from[1] + (to[1] - from[1]) * t,
            ]
        })
        .collect()
}

/// Like [`generate_waypoints`], with latitude lifted by `sin(t·π)·height`.
pub fn create_arc_path(from: LngLat, to: LngLat, height: f64, steps: usize) -> Vec<LngLat> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let arc = (t * PI).sin() * height;
            [
                from[0] + (to[0] - from[0]) * t,
                from[1] + (to[1] - from[1]) * t + arc,
            ]
        })
        .collect()
}

/// One GeoJSON `LineString` feature chaining the segments in order.
pub fn route_geojson(segments: &[&RouteSegment]) -> Value {
    let mut coordinates: Vec<LngLat> = Vec::with_capacity(segments.len() + 1);
    for segment in segments {
        if coordinates.is_empty() {
            coordinates.push(segment.from);
        }
        coordinates.push(segment.to);
    }
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
    })
}

pub fn routes_by_kind(segments: &[RouteSegment]) -> BTreeMap<RouteKind, Value> {
    let mut grouped: BTreeMap<RouteKind, Vec<&RouteSegment>> = BTreeMap::new();
    for segment in segments {
        grouped.entry(segment.kind).or_default().push(segment);
    }
    grouped
        .into_iter()
        .map(|(kind, segments)| (kind, route_geojson(&segments)))
        .collect()
}

pub fn is_valid_lng_lat(coord: LngLat) -> bool {
    let [lng, lat] = coord;
    lng.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lng) && (-90.0..=90.0).contains(&lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(title: &str, coordinates: LngLat, kind: MarkerKind) -> Marker {
        Marker {
            id: None,
            coordinates,
            title: title.to_string(),
            description: None,
            kind,
            icon: None,
            color: None,
        }
    }

    fn segment(from: LngLat, to: LngLat, kind: RouteKind) -> RouteSegment {
        RouteSegment {
            id: None,
            from,
            to,
            kind,
            color: None,
            width: None,
            dashed: false,
            animated: false,
        }
    }

    #[test]
    fn empty_markers_fall_back_to_world_view() {
        assert_eq!(calculate_map_bounds(&[]), MapBounds::world());
    }

    #[test]
    fn bounds_center_and_zoom_follow_span() {
        let markers = vec![
            marker("Beijing", [116.4, 39.9], MarkerKind::City),
            marker("Shanghai", [121.5, 31.2], MarkerKind::City),
        ];

        let bounds = calculate_map_bounds(&markers);
        assert!((bounds.center[0] - 118.95).abs() < 1e-9);
        assert!((bounds.center[1] - 35.55).abs() < 1e-9);
        assert_eq!(bounds.zoom, 6.0);
        assert_eq!(bounds.bounds, [[116.4, 31.2], [121.5, 39.9]]);

        let single = calculate_map_bounds(&markers[..1]);
        assert_eq!(single.zoom, 16.0);
    }

    #[test]
    fn zoom_thresholds() {
        assert_eq!(zoom_for_span(0.05), 12.0);
        assert_eq!(zoom_for_span(0.5), 8.0);
        assert_eq!(zoom_for_span(30.0), 4.0);
        assert_eq!(zoom_for_span(50.0), 2.0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Beijing to Shanghai is roughly 1070 km.
        let distance = haversine_km([116.4074, 39.9042], [121.4737, 31.2304]);
        assert!((distance - 1067.0).abs() < 10.0, "got {distance}");
        assert_eq!(haversine_km([10.0, 10.0], [10.0, 10.0]), 0.0);
    }

    #[test]
    fn route_distance_sums_segments() {
        let segments = vec![
            segment([0.0, 0.0], [1.0, 0.0], RouteKind::Train),
            segment([1.0, 0.0], [2.0, 0.0], RouteKind::Train),
        ];

        let total = route_distance_km(&segments);
        let single = haversine_km([0.0, 0.0], [1.0, 0.0]);
        assert!((total - 2.0 * single).abs() < 1e-9);
    }

    #[test]
    fn nearest_marker_prefers_first_on_tie() {
        let markers = vec![
            marker("west", [-1.0, 0.0], MarkerKind::Landmark),
            marker("east", [1.0, 0.0], MarkerKind::Landmark),
            marker("far", [50.0, 0.0], MarkerKind::Landmark),
        ];

        assert_eq!(find_nearest_marker([0.0, 0.0], &markers).unwrap().title, "west");
        assert_eq!(find_nearest_marker([40.0, 0.0], &markers).unwrap().title, "far");
        assert!(find_nearest_marker([0.0, 0.0], &[]).is_none());
    }

    #[test]
    fn markers_group_by_kind() {
        let markers = vec![
            marker("Xi'an", [108.9, 34.3], MarkerKind::City),
            marker("Great Wall", [116.6, 40.4], MarkerKind::Landmark),
            marker("Chengdu", [104.1, 30.7], MarkerKind::City),
        ];

        let groups = group_markers_by_kind(&markers);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&MarkerKind::City].len(), 2);
        assert_eq!(groups[&MarkerKind::Landmark][0].title, "Great Wall");
    }

    #[test]
    fn waypoints_include_both_ends() {
        let points = generate_waypoints([0.0, 0.0], [10.0, 20.0], DEFAULT_WAYPOINT_STEPS);

        assert_eq!(points.len(), 21);
        assert_eq!(points[0], [0.0, 0.0]);
        assert_eq!(points[10], [5.0, 10.0]);
        assert_eq!(points[20], [10.0, 20.0]);
        assert_eq!(generate_waypoints([0.0, 0.0], [1.0, 1.0], 0).len(), 2);
    }

    #[test]
    fn arc_path_peaks_midway() {
        let points = create_arc_path([0.0, 0.0], [30.0, 0.0], DEFAULT_ARC_HEIGHT, DEFAULT_ARC_STEPS);

        assert_eq!(points.len(), 31);
        assert!((points[15][1] - 0.3).abs() < 1e-9);
        assert!(points[30][1].abs() < 1e-9);
        assert_eq!(points[30][0], 30.0);
    }

    #[test]
    fn routes_become_linestrings_per_kind() {
        let segments = vec![
            segment([116.4, 39.9], [108.9, 34.3], RouteKind::Train),
            segment([108.9, 34.3], [104.1, 30.7], RouteKind::Train),
            segment([104.1, 30.7], [121.5, 31.2], RouteKind::Flight),
        ];

        let routes = routes_by_kind(&segments);
        assert_eq!(routes.len(), 2);

        let train = &routes[&RouteKind::Train];
        assert_eq!(train["geometry"]["type"], "LineString");
        assert_eq!(
            train["geometry"]["coordinates"],
            json!([[116.4, 39.9], [108.9, 34.3], [104.1, 30.7]])
        );
        assert_eq!(
            routes[&RouteKind::Flight]["geometry"]["coordinates"]
                .as_array()
                .map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn marker_accepts_coords_and_type_aliases() {
        let marker: Marker = serde_json::from_str(
            r#"{"coords":[113.26,23.13],"title":"Guangzhou","type":"city"}"#,
        )
        .expect("marker json");

        assert_eq!(marker.coordinates, [113.26, 23.13]);
        assert_eq!(marker.kind, MarkerKind::City);
        assert!(is_valid_lng_lat(marker.coordinates));
        assert!(!is_valid_lng_lat([200.0, 0.0]));
        assert!(!is_valid_lng_lat([0.0, f64::NAN]));
    }
}
