use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt()) * 1000.0
}

/// Circular boundary around a reference coordinate. A point whose distance
/// is strictly greater than `radius_m` is outside; exactly on the boundary
/// counts as inside.
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct GeofenceCheck {
    pub distance_m: f64,
    pub within: bool,
}

impl Geofence {
    pub fn evaluate(&self, point: GeoPoint) -> GeofenceCheck {
        let distance_m = haversine_distance_m(self.center, point);
        GeofenceCheck {
            distance_m,
            within: !(distance_m > self.radius_m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPUS: GeoPoint = GeoPoint {
        lat: -7.806817,
        lng: 110.327136,
    };

    // ~1 degree of latitude in meters at R = 6371 km
    const METERS_PER_DEG_LAT: f64 = 111_194.926;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance_m(CAMPUS, CAMPUS), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint { lat: -7.80, lng: 110.32 };
        let b = GeoPoint { lat: -7.81, lng: 110.34 };
        let ab = haversine_distance_m(a, b);
        let ba = haversine_distance_m(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn point_near_campus_is_within_radius() {
        let device = GeoPoint { lat: -7.8068, lng: 110.3271 };
        let fence = Geofence { center: CAMPUS, radius_m: 50.0 };
        let check = fence.evaluate(device);
        assert!(check.within);
        assert!(check.distance_m < 50.0);
    }

    #[test]
    fn boundary_distance_is_accepted_just_beyond_is_not() {
        let device = GeoPoint { lat: CAMPUS.lat + 40.0 / METERS_PER_DEG_LAT, lng: CAMPUS.lng };
        let d = haversine_distance_m(CAMPUS, device);

        // radius set to the exact computed distance: on the boundary, accepted
        let on_boundary = Geofence { center: CAMPUS, radius_m: d };
        assert!(on_boundary.evaluate(device).within);

        // any tighter radius rejects
        let tighter = Geofence { center: CAMPUS, radius_m: d - 0.001 };
        let check = tighter.evaluate(device);
        assert!(!check.within);
        assert!((check.distance_m - d).abs() < 1e-9);
    }

    #[test]
    fn far_away_point_is_rejected_with_distance() {
        let device = GeoPoint { lat: CAMPUS.lat + 500.0 / METERS_PER_DEG_LAT, lng: CAMPUS.lng };
        let fence = Geofence { center: CAMPUS, radius_m: 50.0 };
        let check = fence.evaluate(device);
        assert!(!check.within);
        assert!(check.distance_m > 499.0 && check.distance_m < 501.0);
    }
}
