use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, as used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degree window for the bounding-box pre-filter. Chosen against the
/// degree-precision rule of thumb (0.01 degrees is roughly 1.11 km near
/// the equator) to shrink the candidate set before the trig work.
pub const BOUNDING_BOX_DEGREES: f64 = 0.007;

/// Default half-angle of the camera cone for bearing filtering.
pub const BEARING_TOLERANCE_DEGREES: f64 = 45.0;

/// A WGS84-like coordinate pair in degrees. No datum conversion is done.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Finite and within the usual -90..90 / -180..180 ranges.
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance between two points, in kilometers.
///
/// `a = sin^2(dlat/2) + cos(lat1) * cos(lat2) * sin^2(dlon/2)`
/// `d = 2 * R * atan2(sqrt(a), sqrt(1 - a))`
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let d_lat = lat1 - lat2;
    let d_lon = lon1 - lon2;

    let h = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Bearing from `origin` to `target` in degrees, normalized to [0, 360).
///
/// Computed as `atan2(dlon, dlat)` on raw degree deltas, matching how the
/// mobile clients have always interpreted the camera angle.
pub fn bearing_degrees(origin: GeoPoint, target: GeoPoint) -> f64 {
    let angle = (target.longitude - origin.longitude)
        .atan2(target.latitude - origin.latitude)
        .to_degrees();
    (angle + 360.0) % 360.0
}

/// Difference between the camera heading and a bearing, folded into
/// [0, 180) as `(|heading - bearing| + 180) % 180`.
///
/// This folding does not measure true angular distance on a circle: a
/// 190-degree difference collapses to 10, but 350 collapses to 170. It is
/// kept verbatim because changing it changes which restaurants a scan
/// returns; see the open-question notes in DESIGN.md before touching it.
pub fn bearing_difference_degrees(camera_heading: f64, bearing: f64) -> f64 {
    let diff = (camera_heading - bearing).abs();
    (diff + 180.0) % 180.0
}

/// Axis-aligned degree window used as a cheap candidate pre-filter.
///
/// Purely an optimization: it can reject true positives where longitudes
/// wrap at the 180th meridian or near the poles. The exhaustive scan is
/// the functional ground truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Window of `window_degrees` in every direction around `origin`.
    pub fn around(origin: GeoPoint, window_degrees: f64) -> Self {
        Self {
            min_latitude: origin.latitude - window_degrees,
            max_latitude: origin.latitude + window_degrees,
            min_longitude: origin.longitude - window_degrees,
            max_longitude: origin.longitude + window_degrees,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.latitude >= self.min_latitude
            && point.latitude <= self.max_latitude
            && point.longitude >= self.min_longitude
            && point.longitude <= self.max_longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(10.0, 10.0);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(10.0, 10.0);
        let b = GeoPoint::new(10.1, 10.1);
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn adjacent_block_is_about_157_meters() {
        let origin = GeoPoint::new(10.0, 10.0);
        let restaurant = GeoPoint::new(10.001, 10.001);
        let km = haversine_km(origin, restaurant);
        assert!((0.150..0.165).contains(&km), "got {} km", km);
    }

    #[test]
    fn tenth_of_a_degree_is_about_15_7_km() {
        let origin = GeoPoint::new(10.0, 10.0);
        let restaurant = GeoPoint::new(10.1, 10.1);
        let km = haversine_km(origin, restaurant);
        assert!((15.0..16.5).contains(&km), "got {} km", km);
    }

    #[test]
    fn bearing_is_normalized_to_0_360() {
        let origin = GeoPoint::new(0.0, 0.0);
        // Due "north" in the client convention: positive dlat, zero dlon
        assert_eq!(bearing_degrees(origin, GeoPoint::new(1.0, 0.0)), 0.0);
        // Negative raw atan2 results wrap into the upper half
        let west = bearing_degrees(origin, GeoPoint::new(0.0, -1.0));
        assert!((west - 270.0).abs() < 1e-9, "got {}", west);
    }

    #[test]
    fn bearing_difference_folds_modulo_180() {
        assert_eq!(bearing_difference_degrees(30.0, 20.0), 10.0);
        // Reflex difference collapses: 190 apart reads as 10
        assert_eq!(bearing_difference_degrees(200.0, 10.0), 10.0);
        // ...but 350 apart reads as 170, not 10. Kept as-is.
        assert_eq!(bearing_difference_degrees(355.0, 5.0), 170.0);
    }

    #[test]
    fn bounding_box_window_contains_nearby_point() {
        let bounds = BoundingBox::around(GeoPoint::new(10.0, 10.0), BOUNDING_BOX_DEGREES);
        assert!(bounds.contains(GeoPoint::new(10.001, 10.001)));
        assert!(!bounds.contains(GeoPoint::new(10.1, 10.1)));
    }

    #[test]
    fn bounding_box_does_not_wrap_at_the_date_line() {
        // Known divergence from the exhaustive scan: a point just across
        // the 180th meridian is physically close but outside the box.
        let bounds = BoundingBox::around(GeoPoint::new(0.0, 179.999), BOUNDING_BOX_DEGREES);
        assert!(!bounds.contains(GeoPoint::new(0.0, -179.999)));
    }

    #[test]
    fn non_finite_points_are_rejected() {
        assert!(!GeoPoint::new(f64::NAN, 10.0).is_finite());
        assert!(!GeoPoint::new(10.0, f64::INFINITY).is_finite());
        assert!(GeoPoint::new(10.0, 10.0).is_valid());
        assert!(!GeoPoint::new(91.0, 10.0).is_valid());
        assert!(!GeoPoint::new(10.0, 181.0).is_valid());
    }
}
