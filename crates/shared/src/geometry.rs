//! Spherical geometry helpers used by the geofencing engine.
//!
//! Polygons are plain vertex slices and are implicitly closed: the last vertex
//! connects back to the first, so a repeated closing vertex is optional.
//! Callers must supply at least three vertices.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::coord! { x: c.longitude, y: c.latitude }
    }
}

/// Great-circle distance between two coordinates in kilometers (haversine).
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Even-odd ray casting test with longitude as x and latitude as y.
pub fn point_in_polygon(point: Coordinate, polygon: &[Coordinate]) -> bool {
    let x = point.longitude;
    let y = point.latitude;
    let mut inside = false;

    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].longitude, polygon[i].latitude);
        let (xj, yj) = (polygon[j].longitude, polygon[j].latitude);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Minimum distance in kilometers from a point to a polygon's boundary.
///
/// Returns exactly `0.0` when the point lies inside the polygon.
pub fn distance_to_polygon(point: Coordinate, polygon: &[Coordinate]) -> f64 {
    if point_in_polygon(point, polygon) {
        return 0.0;
    }

    let mut min_distance = f64::INFINITY;
    for (i, start) in polygon.iter().enumerate() {
        let end = polygon[(i + 1) % polygon.len()];
        min_distance = min_distance.min(distance_to_segment(point, *start, end));
    }

    min_distance
}

/// Projects `point` onto segment `a`-`b` in lat/lon space, clamps to the
/// segment, and measures the haversine distance to the projected point.
///
/// The planar projection is only accurate at the few-kilometer scales that
/// warning distances use; alert thresholds are tuned against it.
fn distance_to_segment(point: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let dx = point.latitude - a.latitude;
    let dy = point.longitude - a.longitude;
    let seg_x = b.latitude - a.latitude;
    let seg_y = b.longitude - a.longitude;

    let len_sq = seg_x * seg_x + seg_y * seg_y;
    let param = if len_sq != 0.0 {
        (dx * seg_x + dy * seg_y) / len_sq
    } else {
        -1.0
    };

    let closest = if param < 0.0 {
        a
    } else if param > 1.0 {
        b
    } else {
        Coordinate::new(a.latitude + param * seg_x, a.longitude + param * seg_y)
    };

    haversine_distance(point, closest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;
    use rand::Rng;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(10.0, 70.0),
            Coordinate::new(10.0, 70.2),
            Coordinate::new(10.2, 70.2),
            Coordinate::new(10.2, 70.0),
        ]
    }

    fn random_coordinate(rng: &mut impl Rng) -> Coordinate {
        Coordinate::new(rng.gen_range(-85.0..85.0), rng.gen_range(-180.0..180.0))
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let a = random_coordinate(&mut rng);
            assert_eq!(haversine_distance(a, a), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let a = random_coordinate(&mut rng);
            let b = random_coordinate(&mut rng);
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!(ab >= 0.0);
            assert!((ab - ba).abs() < 1e-9, "{} != {}", ab, ba);
        }
    }

    #[test]
    fn test_distance_known_value() {
        // Mumbai to Kochi, roughly 1,080 km
        let mumbai = Coordinate::new(19.076, 72.8777);
        let kochi = Coordinate::new(9.9312, 76.2673);
        let d = haversine_distance(mumbai, kochi);
        assert!((d - 1080.19).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_point_in_polygon_inside_and_outside() {
        let poly = square();
        assert!(point_in_polygon(Coordinate::new(10.1, 70.1), &poly));
        assert!(point_in_polygon(Coordinate::new(10.01, 70.19), &poly));
        assert!(!point_in_polygon(Coordinate::new(10.3, 70.1), &poly));
        assert!(!point_in_polygon(Coordinate::new(10.1, 69.9), &poly));
    }

    #[test]
    fn test_point_in_polygon_with_repeated_closing_vertex() {
        let mut poly = square();
        poly.push(poly[0]);
        assert!(point_in_polygon(Coordinate::new(10.1, 70.1), &poly));
        assert!(!point_in_polygon(Coordinate::new(11.0, 70.1), &poly));
    }

    #[test]
    fn test_point_in_polygon_uses_longitude_as_x() {
        // Tall, thin polygon: wide in latitude, narrow in longitude
        let poly = vec![
            Coordinate::new(0.0, 10.0),
            Coordinate::new(0.0, 10.1),
            Coordinate::new(5.0, 10.1),
            Coordinate::new(5.0, 10.0),
        ];
        assert!(point_in_polygon(Coordinate::new(2.5, 10.05), &poly));
        assert!(!point_in_polygon(Coordinate::new(10.05, 2.5), &poly));
    }

    #[test]
    fn test_point_in_polygon_agrees_with_geo() {
        let poly = square();
        let geo_poly = geo::Polygon::new(
            geo::LineString::from(
                poly.iter().map(|c| geo::Coord::from(*c)).collect::<Vec<_>>(),
            ),
            vec![],
        );

        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let p = Coordinate::new(rng.gen_range(9.9..10.3), rng.gen_range(69.9..70.3));
            // Skip points that sit on an edge, where the two conventions differ.
            let on_edge = [10.0, 10.2].iter().any(|v| (p.latitude - v).abs() < 1e-9)
                || [70.0, 70.2].iter().any(|v| (p.longitude - v).abs() < 1e-9);
            if on_edge {
                continue;
            }
            assert_eq!(
                point_in_polygon(p, &poly),
                geo_poly.contains(&geo::Point::from(p)),
                "disagreement at {:?}",
                p
            );
        }
    }

    #[test]
    fn test_distance_to_polygon_inside_is_zero() {
        assert_eq!(distance_to_polygon(Coordinate::new(10.1, 70.1), &square()), 0.0);
    }

    #[test]
    fn test_distance_to_polygon_perpendicular_to_edge() {
        // 0.1 degree of latitude north of the top edge
        let d = distance_to_polygon(Coordinate::new(10.3, 70.1), &square());
        assert!((d - 11.1195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_distance_to_polygon_clamps_to_vertex() {
        let corner = Coordinate::new(10.2, 70.2);
        let p = Coordinate::new(10.3, 70.3);
        let d = distance_to_polygon(p, &square());
        assert!((d - haversine_distance(p, corner)).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_polygon_monotonic_along_ray() {
        let poly = square();
        let vertex = poly[2];
        let mut last = 0.0;
        for step in 1..50 {
            let offset = step as f64 * 0.05;
            let p = Coordinate::new(vertex.latitude + offset, vertex.longitude + offset);
            let d = distance_to_polygon(p, &poly);
            assert!(d >= last, "distance decreased at step {}: {} < {}", step, d, last);
            last = d;
        }
    }

    #[test]
    fn test_degenerate_segment_does_not_panic() {
        let mut poly = square();
        poly.insert(1, poly[0]);
        let d = distance_to_polygon(Coordinate::new(9.9, 70.0), &poly);
        assert!(d > 0.0 && d.is_finite());
    }

    #[test]
    fn test_coordinate_geo_point_conversion() {
        let c = Coordinate::new(18.95, 72.75);
        let p: geo::Point<f64> = c.into();
        assert_eq!(p.x(), 72.75);
        assert_eq!(p.y(), 18.95);
        assert_eq!(Coordinate::from(p), c);
    }

    #[test]
    fn test_coordinate_serialization() {
        let json = serde_json::to_string(&Coordinate::new(8.8, 79.7)).unwrap();
        assert_eq!(json, r#"{"latitude":8.8,"longitude":79.7}"#);
    }
}
