//! Great-circle distance for nearby-listing search.

use crate::models::GeoPoint;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance between two points, in metres.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Keep the items within `max_distance_m` of `origin`, nearest first.
pub fn nearest_within<T, F>(items: Vec<T>, origin: GeoPoint, max_distance_m: f64, point_of: F) -> Vec<T>
where
    F: Fn(&T) -> GeoPoint,
{
    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .map(|item| (distance_m(origin, point_of(&item)), item))
        .filter(|(distance, _)| *distance <= max_distance_m)
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        let tirana = GeoPoint::new(19.8187, 41.3275);
        assert!(distance_m(tirana, tirana) < 1e-6);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let d = distance_m(a, b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_nearest_within_filters_and_sorts() {
        let origin = GeoPoint::new(19.8187, 41.3275);
        let points = vec![
            ("far", GeoPoint::new(20.5, 41.3)),
            ("close", GeoPoint::new(19.8190, 41.3276)),
            ("near", GeoPoint::new(19.8230, 41.3290)),
        ];
        let kept = nearest_within(points, origin, 1_000.0, |(_, p)| *p);
        let names: Vec<&str> = kept.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["close", "near"]);
    }
}
