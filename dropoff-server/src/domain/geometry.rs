//! Great-circle primitives on a spherical earth.

use super::GeoPoint;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine).
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can push h just outside [0, 1] for antipodal inputs.
    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial compass bearing from `a` to `b`, in degrees within `[0, 360)`.
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    let deg = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if deg >= 360.0 { 0.0 } else { deg }
}

/// Point reached by travelling `meters` from `p` along `bearing_deg`.
///
/// Longitude is normalised to `[-180, 180]`.
pub fn offset(p: &GeoPoint, bearing_deg: f64, meters: f64) -> GeoPoint {
    let delta = meters / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = p.lat.to_radians();
    let lng1 = p.lng.to_radians();

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lng2 = lng1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

    let lng_deg = (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;

    GeoPoint {
        lat: lat2.to_degrees(),
        lng: lng_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn zero_distance() {
        let p = pt(40.7128, -74.0060);
        assert_eq!(distance(&p, &p), 0.0);
    }

    #[test]
    fn known_distance() {
        // One degree of latitude along a meridian
        let d = distance(&pt(0.0, 0.0), &pt(1.0, 0.0));
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antipodal_is_half_circumference() {
        let d = distance(&pt(0.0, 0.0), &pt(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half).abs() < 1e-6 * half);
        assert!(d.is_finite());
    }

    #[test]
    fn near_pole() {
        let d = distance(&pt(89.9999, 0.0), &pt(89.9999, 180.0));
        assert!(d.is_finite());
        assert!(d < 30.0, "got {d}");
    }

    #[test]
    fn cardinal_bearings() {
        let origin = pt(0.0, 0.0);
        assert!((bearing(&origin, &pt(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(&origin, &pt(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(&origin, &pt(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(&origin, &pt(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn offset_travels_requested_distance() {
        let start = pt(40.7128, -74.0060);
        let end = offset(&start, 45.0, 1_000.0);
        assert!((distance(&start, &end) - 1_000.0).abs() < 0.01);
        assert!((bearing(&start, &end) - 45.0).abs() < 0.01);
    }

    #[test]
    fn offset_wraps_longitude() {
        let end = offset(&pt(0.0, 179.999), 90.0, 1_000.0);
        assert!(end.lng < -179.0);
        assert!(end.validate().is_ok());
    }
}
