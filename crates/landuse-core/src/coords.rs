/// Geographic coordinate types and distance helpers.
/// All coordinate math uses f64 for precision.
use geographiclib_rs::{Geodesic, InverseGeodesic};
use serde::{Deserialize, Serialize};

/// Flat-earth conversion used for search radii: 1° ≈ 111 320 m.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A point in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, -180 to +180.
    pub lng: f64,
}

impl LatLon {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert to radians.
    pub fn to_radians(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }

    /// Ellipsoidal distance to `other` in kilometres.
    pub fn distance_km(self, other: LatLon) -> f64 {
        geodesic_km(self, other)
    }
}

/// Convert a radius in metres to degrees with the fixed 111 320 m/° factor.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Shortest distance on the WGS-84 ellipsoid in kilometres (Karney's
/// inverse geodesic).
pub fn geodesic_km(a: LatLon, b: LatLon) -> f64 {
    let meters: f64 = Geodesic::wgs84().inverse(a.lat, a.lng, b.lat, b.lng);
    meters / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn one_degree_of_latitude_follows_the_ellipsoid() {
        // Meridian arcs are shorter at the equator than near the poles.
        let equator = geodesic_km(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        let polar = geodesic_km(LatLon::new(80.0, 0.0), LatLon::new(81.0, 0.0));
        assert_abs_diff_eq!(equator, 110.574, epsilon = 0.001);
        assert_abs_diff_eq!(polar, 111.663, epsilon = 0.001);
    }

    #[test]
    fn short_meridian_arc_at_the_equator() {
        // 0.00902° north of (0, 0) is just under a kilometre on WGS-84,
        // although a sphere puts it just over.
        let d = geodesic_km(LatLon::new(0.0, 0.0), LatLon::new(0.00902, 0.0));
        assert_abs_diff_eq!(d, 0.9974, epsilon = 1e-4);
        assert!(d < 1.0);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let mut rng_state: u64 = 7;
        for _ in 0..500 {
            // LCG for deterministic pseudo-random
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let lat = (rng_state as f64 / u64::MAX as f64) * 170.0 - 85.0;
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let lng = (rng_state as f64 / u64::MAX as f64) * 360.0 - 180.0;

            let a = LatLon::new(lat, lng);
            let b = LatLon::new(6.927079, 79.861243);
            assert_abs_diff_eq!(a.distance_km(b), b.distance_km(a), epsilon = 1e-6);
            assert_abs_diff_eq!(a.distance_km(a), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn radius_conversion_uses_fixed_factor() {
        assert_abs_diff_eq!(meters_to_degrees(111_320.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(meters_to_degrees(1113.2), 0.01, epsilon = 1e-12);
    }
}
