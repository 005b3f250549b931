//! Geographical points in WGS84 coordinates.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::error::{GeolearnError, Result};

/// A geographical point with latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeolearnError::record(format!(
                "invalid latitude: {lat} (must be between -90 and 90)"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeolearnError::record(format!(
                "invalid longitude: {lon} (must be between -180 and 180)"
            )));
        }

        Ok(GeoPoint { lat, lon })
    }

    /// Compute the great-circle midpoint between this point and another.
    ///
    /// Uses the spherical midpoint formula rather than a linear average,
    /// so longitude wrap-around and the latitude distortion away from the
    /// equator are handled correctly. Input and output are in degrees;
    /// the computation happens in radians.
    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let bx = lat2.cos() * delta_lon.cos();
        let by = lat2.cos() * delta_lon.sin();

        let mid_lat = (lat1.sin() + lat2.sin())
            .atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
        let mid_lon = lon1 + by.atan2(lat1.cos() + bx);

        // Normalize longitude back into [-180, 180].
        let lon_deg = (mid_lon.to_degrees() + 540.0) % 360.0 - 180.0;

        GeoPoint {
            lat: mid_lat.to_degrees(),
            lon: lon_deg,
        }
    }

    /// Convert to a `geo` crate point (x = longitude, y = latitude).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &GeoPoint, b: &GeoPoint, tol: f64) -> bool {
        (a.lat - b.lat).abs() < tol && (a.lon - b.lon).abs() < tol
    }

    #[test]
    fn test_point_validation() {
        assert!(GeoPoint::new(40.0, -74.0).is_ok());
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 181.0).is_err());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_midpoint_of_identical_points() {
        let a = GeoPoint::new(38.0, -97.0).unwrap();
        let mid = a.midpoint(&a);
        assert!(approx_eq(&mid, &a, 1e-9));
    }

    #[test]
    fn test_midpoint_is_symmetric() {
        let a = GeoPoint::new(34.05, -118.24).unwrap();
        let b = GeoPoint::new(40.71, -74.0).unwrap();
        let ab = a.midpoint(&b);
        let ba = b.midpoint(&a);
        assert!(approx_eq(&ab, &ba, 1e-9));
    }

    #[test]
    fn test_midpoint_on_equator() {
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(0.0, 90.0).unwrap();
        let mid = a.midpoint(&b);
        assert!(approx_eq(&mid, &GeoPoint { lat: 0.0, lon: 45.0 }, 1e-9));
    }

    #[test]
    fn test_midpoint_crosses_antimeridian() {
        let a = GeoPoint::new(0.0, 179.0).unwrap();
        let b = GeoPoint::new(0.0, -179.0).unwrap();
        let mid = a.midpoint(&b);
        // The great-circle midpoint sits on the antimeridian, not at 0.
        assert!((mid.lon.abs() - 180.0).abs() < 1e-9 || (mid.lon - 180.0).abs() < 1e-9);
        assert!(mid.lat.abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_differs_from_linear_average() {
        // At high latitudes the spherical midpoint is noticeably north of
        // the naive average.
        let a = GeoPoint::new(60.0, -30.0).unwrap();
        let b = GeoPoint::new(60.0, 30.0).unwrap();
        let mid = a.midpoint(&b);
        assert!(mid.lat > 60.0);
        assert!(mid.lon.abs() < 1e-9);
    }
}
