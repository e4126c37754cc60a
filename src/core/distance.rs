use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{DiscoveryError, Result};
use crate::models::{BoundingBox, Coordinate};

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack added to bounding boxes so rounding in the distance formula never
/// places a matching point outside the box (~1 m)
const BBOX_MARGIN_DEG: f64 = 1e-5;

/// Great-circle math over a spherical Earth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoMath {
    earth_radius_km: f64,
}

impl GeoMath {
    pub fn new(earth_radius_km: f64) -> Self {
        Self { earth_radius_km }
    }

    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    /// Great-circle distance in kilometers (spherical law of cosines)
    ///
    /// # Arguments
    /// * `a` - First point in degrees
    /// * `b` - Second point in degrees
    ///
    /// # Returns
    /// Distance in kilometers, or `InvalidCoordinate` if either point is NaN,
    /// infinite or out of range
    #[inline]
    pub fn distance_km(&self, a: Coordinate, b: Coordinate) -> Result<f64> {
        validate_coordinate(a)?;
        validate_coordinate(b)?;

        if a == b {
            return Ok(0.0);
        }

        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let delta_lon = (b.longitude - a.longitude).abs().to_radians();

        let cos_angle = lat1.cos() * lat2.cos() * delta_lon.cos() + lat1.sin() * lat2.sin();

        // Rounding can push the argument just past ±1 for (nearly) identical points
        Ok(self.earth_radius_km * cos_angle.clamp(-1.0, 1.0).acos())
    }

    /// Initial bearing from `a` towards `b`, in degrees clockwise from north [0, 360)
    pub fn initial_bearing_deg(&self, a: Coordinate, b: Coordinate) -> Result<f64> {
        validate_coordinate(a)?;
        validate_coordinate(b)?;

        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let delta_lon = (b.longitude - a.longitude).to_radians();

        let y = delta_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

        Ok((y.atan2(x).to_degrees() + 360.0) % 360.0)
    }

    /// Rectangle enclosing every point within `radius_km` of `center`
    ///
    /// Used as a cheap pre-filter before the exact distance check. Returns `None`
    /// when the circle reaches a pole or crosses the antimeridian, since no single
    /// lat/lon rectangle covers it.
    pub fn bounding_box(&self, center: Coordinate, radius_km: f64) -> Option<BoundingBox> {
        if !center.is_valid() || !radius_km.is_finite() || radius_km < 0.0 {
            return None;
        }

        let angular = radius_km / self.earth_radius_km;
        let lat = center.latitude.to_radians();
        let min_lat = lat - angular;
        let max_lat = lat + angular;

        if angular >= PI || min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
            return None;
        }

        let delta_lon = (angular.sin() / lat.cos()).asin().to_degrees();
        let min_lon = center.longitude - delta_lon - BBOX_MARGIN_DEG;
        let max_lon = center.longitude + delta_lon + BBOX_MARGIN_DEG;

        if min_lon < -180.0 || max_lon > 180.0 {
            return None;
        }

        Some(BoundingBox::new(
            min_lat.to_degrees() - BBOX_MARGIN_DEG,
            max_lat.to_degrees() + BBOX_MARGIN_DEG,
            min_lon,
            max_lon,
        ))
    }
}

impl Default for GeoMath {
    fn default() -> Self {
        Self::new(EARTH_RADIUS_KM)
    }
}

/// Reject NaN, infinite and out-of-range coordinates
pub fn validate_coordinate(point: Coordinate) -> Result<()> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(DiscoveryError::InvalidCoordinate {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}
