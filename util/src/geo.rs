//! Great-circle distance helpers used for the check-in geofence.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two latitude/longitude pairs (degrees).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns `true` iff `(lat, lon)` lies within `radius_km` of `(ref_lat, ref_lon)`.
///
/// Non-finite input never passes: the NaN distance fails the `<=` comparison.
pub fn is_within_radius(ref_lat: f64, ref_lon: f64, lat: f64, lon: f64, radius_km: f64) -> bool {
    haversine_km(ref_lat, ref_lon, lat, lon) <= radius_km
}

/// Latitude in [-90, 90] and longitude in [-180, 180].
pub fn valid_coordinates(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLR: (f64, f64) = (12.9716, 77.5946);

    #[test]
    fn same_point_is_within_any_radius() {
        assert_eq!(haversine_km(BLR.0, BLR.1, BLR.0, BLR.1), 0.0);
        assert!(is_within_radius(BLR.0, BLR.1, BLR.0, BLR.1, 0.0));
        assert!(is_within_radius(BLR.0, BLR.1, BLR.0, BLR.1, 1.0));
    }

    #[test]
    fn five_km_north_is_outside_one_km() {
        // 0.045 degrees of latitude is ~5.0 km
        let lat = BLR.0 + 0.045;
        let d = haversine_km(BLR.0, BLR.1, lat, BLR.1);
        assert!((d - 5.0).abs() < 0.05, "distance was {d}");
        assert!(!is_within_radius(BLR.0, BLR.1, lat, BLR.1, 1.0));
        assert!(is_within_radius(BLR.0, BLR.1, lat, BLR.1, 5.1));
    }

    #[test]
    fn a_few_hundred_metres_is_inside_one_km() {
        let lat = BLR.0 + 0.004; // ~445 m
        assert!(is_within_radius(BLR.0, BLR.1, lat, BLR.1, 1.0));
    }

    #[test]
    fn known_city_pair_distance() {
        // Bengaluru -> Chennai is roughly 290 km as the crow flies
        let d = haversine_km(BLR.0, BLR.1, 13.0827, 80.2707);
        assert!((280.0..300.0).contains(&d), "distance was {d}");
    }

    #[test]
    fn nan_input_is_rejected() {
        assert!(!is_within_radius(f64::NAN, BLR.1, BLR.0, BLR.1, 1.0));
        assert!(!valid_coordinates(f64::NAN, 0.0));
    }

    #[test]
    fn coordinate_bounds() {
        assert!(valid_coordinates(90.0, -180.0));
        assert!(!valid_coordinates(90.1, 0.0));
        assert!(!valid_coordinates(0.0, 180.5));
    }
}
