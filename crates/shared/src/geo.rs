//! Great-circle distance helpers.

/// Earth radius in meters used for haversine distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Calculates the haversine distance in meters between two coordinates.
pub fn haversine_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_distance_meters(38.7223, -9.1393, 38.7223, -9.1393), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree along a meridian is R * pi / 180.
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        let d = haversine_distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_lisbon_to_porto() {
        let d = haversine_distance_meters(38.7223, -9.1393, 41.1579, -8.6291);
        assert!((d - 274_000.0).abs() < 2_000.0, "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = haversine_distance_meters(38.0, -9.0, 38.01, -9.02);
        let b = haversine_distance_meters(38.01, -9.02, 38.0, -9.0);
        assert!((a - b).abs() < 1e-9);
    }
}
