//! Great-circle distance and initial bearing.
//!
//! Spherical earth with the mean radius; accurate to well under a metre at
//! the distances a treasure hunt cares about.

use super::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters.
pub fn distance_m(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from `from` toward `to`, in `[0, 360)`.
///
/// Coincident points yield 0. That value carries no direction and should not
/// drive a compass needle.
pub fn bearing_deg(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    normalize_deg(y.atan2(x).to_degrees())
}

/// Distance (m) and initial bearing (deg) in one call.
pub fn distance_and_bearing(from: Coordinate, to: Coordinate) -> (f64, f64) {
    (distance_m(from, to), bearing_deg(from, to))
}

/// Fold an angle into `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let n = (deg + 360.0) % 360.0;
    if n < 0.0 {
        n + 360.0
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CHAMBORD: Coordinate = Coordinate::new(47.6161, 1.5162);

    #[test]
    fn same_point_is_zero_distance() {
        let (d, b) = distance_and_bearing(CHAMBORD, CHAMBORD);
        assert_eq!(d, 0.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn one_degree_latitude_at_equator() {
        let d = distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn cardinal_bearings() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((bearing_deg(origin, Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn croix_town_hall_to_church() {
        // Mairie de Croix -> Église Saint-Martin, a few dozen meters apart.
        let mairie = Coordinate::new(50.6789, 3.1468);
        let eglise = Coordinate::new(50.6781, 3.1462);
        let (d, b) = distance_and_bearing(mairie, eglise);
        assert!(d > 90.0 && d < 110.0, "got {d}");
        assert!(b > 180.0 && b < 270.0, "got {b}");
    }

    #[test]
    fn normalize_handles_negative_and_wrap() {
        assert_eq!(normalize_deg(-90.0), 270.0);
        assert_eq!(normalize_deg(360.0), 0.0);
        assert_eq!(normalize_deg(725.0), 5.0);
        assert!(normalize_deg(-1e-14) < 360.0);
    }

    fn coord() -> impl Strategy<Value = Coordinate> {
        (-89.9f64..89.9, -179.9f64..179.9).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(a in coord()) {
            prop_assert_eq!(distance_m(a, a), 0.0);
        }

        #[test]
        fn distance_is_symmetric(a in coord(), b in coord()) {
            let ab = distance_m(a, b);
            let ba = distance_m(b, a);
            prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
        }

        #[test]
        fn bearing_in_range(a in coord(), b in coord()) {
            let brg = bearing_deg(a, b);
            prop_assert!((0.0..360.0).contains(&brg), "bearing {}", brg);
        }
    }
}
