//! Geographic primitives

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RecommendError;

/// Mean Earth radius (IUGG) in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// WGS84 latitude/longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(lat: f64, lng: f64) -> Result<Self, RecommendError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(RecommendError::InvalidLocation(format!(
                "non-finite coordinates ({lat}, {lng})"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(RecommendError::InvalidLocation(format!(
                "coordinates out of range ({lat}, {lng})"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Shift by degree offsets, clamping latitude and wrapping longitude
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        let lat = (self.lat + dlat).clamp(-90.0, 90.0);
        let mut lng = self.lng + dlng;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Great-circle distance in kilometres (haversine)
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let sf = GeoPoint::new(37.7749, -122.4194).unwrap();
        assert_eq!(haversine_km(sf, sf), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // San Francisco to Los Angeles, ~559 km on the sphere
        let sf = GeoPoint::new(37.7749, -122.4194).unwrap();
        let la = GeoPoint::new(34.0522, -118.2437).unwrap();
        let d = haversine_km(sf, la);
        assert!((d - 559.1).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_one_degree_latitude() {
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(1.0, 0.0).unwrap();
        assert!((haversine_km(a, b) - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_symmetric() {
        let a = GeoPoint::new(51.5, -0.12).unwrap();
        let b = GeoPoint::new(48.85, 2.35).unwrap();
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_points() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_offset_wraps_longitude() {
        let p = GeoPoint::new(89.99, 179.99).unwrap().offset(0.02, 0.02);
        assert_eq!(p.lat, 90.0);
        assert!((p.lng - (-179.99)).abs() < 1e-9);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(1.26), 1.3);
        assert_eq!(round1(1.24), 1.2);
        assert_eq!(round1(0.0), 0.0);
    }
}
