//! Geographic point types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places used for coordinate identity unless configured otherwise.
pub const DEFAULT_KEY_DECIMALS: u32 = 6;

/// Error returned when constructing a point from invalid coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lng}): {reason}")]
pub struct InvalidPoint {
    lat: f64,
    lng: f64,
    reason: &'static str,
}

/// A WGS-84 position in degrees.
///
/// Equality is approximate: two points are equal when they round to the
/// same coordinate at [`DEFAULT_KEY_DECIMALS`] decimal places.
///
/// # Examples
///
/// ```
/// use dropoff_server::domain::GeoPoint;
///
/// let p = GeoPoint::new(40.7580, -73.9855).unwrap();
/// assert_eq!(p, GeoPoint::new(40.75800000004, -73.9855).unwrap());
///
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidPoint> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check that the coordinates are finite and within WGS-84 bounds.
    ///
    /// Points arriving through serde skip [`GeoPoint::new`], so callers
    /// accepting external input validate explicitly.
    pub fn validate(&self) -> Result<(), InvalidPoint> {
        let fail = |reason| InvalidPoint {
            lat: self.lat,
            lng: self.lng,
            reason,
        };

        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(fail("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(fail("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(fail("longitude must be within [-180, 180]"));
        }
        Ok(())
    }

    /// Rounded identity key at the default precision.
    pub fn key(&self) -> CoordKey {
        CoordKey::new(self, DEFAULT_KEY_DECIMALS)
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({:.6}, {:.6})", self.lat, self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Coordinates rounded to a fixed number of decimal places.
///
/// Used as the duplicate-detection key for sampled points and candidates,
/// and as part of provider cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    lat: i64,
    lng: i64,
}

impl CoordKey {
    /// Round `point` to `decimals` decimal places.
    pub fn new(point: &GeoPoint, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            lat: (point.lat * scale).round() as i64,
            lng: (point.lng * scale).round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_points() {
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::new(51.5074, -0.1278).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(90.0001, 0.0).is_err());
        assert!(GeoPoint::new(-91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(0.0, -200.0).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn error_display() {
        let err = GeoPoint::new(95.0, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid coordinate (95, 1): latitude must be within [-90, 90]"
        );
    }

    #[test]
    fn equality_is_rounded() {
        let a = GeoPoint::new(40.1234561, -73.0).unwrap();
        let b = GeoPoint::new(40.1234564, -73.0).unwrap();
        let c = GeoPoint::new(40.123457, -73.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn key_precision() {
        let p = GeoPoint::new(40.123456, -73.987654).unwrap();
        let q = GeoPoint::new(40.123451, -73.987651).unwrap();
        assert_ne!(CoordKey::new(&p, 6), CoordKey::new(&q, 6));
        assert_eq!(CoordKey::new(&p, 4), CoordKey::new(&q, 4));
    }

    #[test]
    fn serde_shape() {
        let p = GeoPoint::new(1.5, -2.25).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lng":-2.25}"#);
    }
}
