//! Planar geometry over waypoint coordinates.
//!
//! Distances treat (longitude, latitude) degrees as a flat 2-D plane. The
//! approximation only holds over small regional extents; there is no
//! spherical correction.

use crate::models::Waypoint;

/// Euclidean distance between two waypoints on the coordinate plane.
pub fn planar_distance(a: &Waypoint, b: &Waypoint) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    (dx * dx + dy * dy).sqrt()
}

/// Bearing of the vector from `origin` to `target` in degrees, in (-180, 180].
pub fn bearing_deg(origin: &Waypoint, target: &Waypoint) -> f64 {
    let deg = (target.lon - origin.lon)
        .atan2(target.lat - origin.lat)
        .to_degrees();
    normalize_heading_deg(deg)
}

/// Wrap an angle in degrees into (-180, 180].
pub fn normalize_heading_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
