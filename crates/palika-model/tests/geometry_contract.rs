use palika_model::{is_valid_point, GeoPoint, GeoPolygon};
use serde_json::json;

#[test]
fn valid_point_in_range() {
    assert!(is_valid_point(&json!({"type": "Point", "coordinates": [85.3, 27.7]})));
}

#[test]
fn boundary_coordinates_are_valid() {
    assert!(is_valid_point(&json!({"type": "Point", "coordinates": [180.0, 90.0]})));
    assert!(is_valid_point(&json!({"type": "Point", "coordinates": [-180.0, -90.0]})));
}

#[test]
fn one_unit_beyond_boundary_is_invalid() {
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": [181.0, 0.0]})));
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": [-181.0, 0.0]})));
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": [0.0, 91.0]})));
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": [0.0, -91.0]})));
}

#[test]
fn wrong_shape_is_invalid_not_an_error() {
    assert!(!is_valid_point(&json!(null)));
    assert!(!is_valid_point(&json!("Point")));
    assert!(!is_valid_point(&json!({"coordinates": [85.3, 27.7]})));
    assert!(!is_valid_point(&json!({"type": "point", "coordinates": [85.3, 27.7]})));
    assert!(!is_valid_point(&json!({"type": "Polygon", "coordinates": [85.3, 27.7]})));
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": [85.3]})));
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": [85.3, 27.7, 1300.0]})));
    assert!(!is_valid_point(&json!({"type": "Point", "coordinates": ["85.3", "27.7"]})));
    assert!(!is_valid_point(&json!({"type": "Point"})));
}

#[test]
fn geo_point_parse_mirrors_the_permissive_check() {
    let point = GeoPoint::parse(&json!({"type": "Point", "coordinates": [85.3, 27.7]}))
        .expect("point");
    assert_eq!(point.longitude, 85.3);
    assert_eq!(point.latitude, 27.7);
    assert!(GeoPoint::parse(&json!({"type": "Point", "coordinates": [200.0, 0.0]})).is_err());
}

#[test]
fn geo_point_value_round_trip() {
    let point = GeoPoint {
        longitude: 85.3,
        latitude: 27.7,
    };
    let parsed = GeoPoint::parse(&point.to_value()).expect("round trip");
    assert_eq!(parsed, point);
}

#[test]
fn polygon_requires_closed_rings() {
    let open = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]});
    assert!(GeoPolygon::parse(&open).is_err());

    let closed = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]});
    assert!(GeoPolygon::parse(&closed).is_ok());
}

#[test]
fn polygon_rejects_short_rings_and_bad_positions() {
    let short = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]});
    assert!(GeoPolygon::parse(&short).is_err());

    let out_of_range =
        json!({"type": "Polygon", "coordinates": [[[0.0, 95.0], [1.0, 0.0], [1.0, 1.0], [0.0, 95.0]]]});
    assert!(GeoPolygon::parse(&out_of_range).is_err());
}

#[test]
fn polygon_centroid_is_outer_ring_vertex_mean() {
    let square = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]});
    let centroid = GeoPolygon::parse(&square).expect("polygon").centroid();
    assert_eq!(centroid.longitude, 1.0);
    assert_eq!(centroid.latitude, 1.0);
}
