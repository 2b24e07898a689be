//! Maps a current position onto a planned route.

use crate::error::NavError;
use crate::models::{Route, Waypoint};
use crate::spatial::planar_distance;

/// Fractional completion of `route` as seen from `position`, in [0, 1].
///
/// Walks segments in order. The first segment whose far endpoint lies within
/// the segment's own length of the position is treated as partially
/// traversed and the walk stops there; a position matching no segment counts
/// as having completed the route.
///
/// Fails with [`NavError::DegenerateRoute`] when the route has zero total
/// distance.
pub fn route_progress(position: &Waypoint, route: &Route) -> Result<f64, NavError> {
    if route.total_distance <= 0.0 {
        return Err(NavError::DegenerateRoute);
    }

    let mut traveled = 0.0;
    for pair in route.waypoints.windows(2) {
        let segment = planar_distance(&pair[0], &pair[1]);
        let to_far_end = planar_distance(position, &pair[1]);
        if to_far_end <= segment {
            traveled += segment - to_far_end;
            break;
        }
        traveled += segment;
    }

    Ok((traveled / route.total_distance).clamp(0.0, 1.0))
}

/// The waypoint to steer toward at the given progress fraction.
///
/// Maps progress onto a segment index; once the index reaches the last
/// segment the final waypoint is returned. `None` only for an empty route.
pub fn next_waypoint(route: &Route, progress: f64) -> Option<&Waypoint> {
    let n = route.waypoints.len();
    if n == 0 {
        return None;
    }
    let index = (progress * (n - 1) as f64) as usize;
    if index >= n - 1 {
        route.waypoints.last()
    } else {
        route.waypoints.get(index + 1)
    }
}
