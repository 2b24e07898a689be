//! Pairwise-distance statistics over a waypoint set.

use crate::error::NavError;
use crate::models::{RouteStatistics, Waypoint};
use crate::spatial::planar_distance;

/// Population mean and variance over all unordered pairwise distances, plus
/// a sample-size confidence score `1 - 1/sqrt(n)`.
///
/// Fails with [`NavError::InsufficientData`] for fewer than two waypoints.
pub fn compute_statistics(waypoints: &[Waypoint]) -> Result<RouteStatistics, NavError> {
    let n = waypoints.len();
    if n < 2 {
        return Err(NavError::InsufficientData(n));
    }

    let mut sum = 0.0;
    let mut sum_squares = 0.0;
    for i in 0..n - 1 {
        for j in i + 1..n {
            let dist = planar_distance(&waypoints[i], &waypoints[j]);
            sum += dist;
            sum_squares += dist * dist;
        }
    }

    let pair_count = (n * (n - 1) / 2) as f64;
    let expected_value = sum / pair_count;
    // Rounding can push mean-of-squares minus square-of-mean a hair below zero.
    let variance = (sum_squares / pair_count - expected_value * expected_value).max(0.0);
    let confidence = 1.0 - 1.0 / (n as f64).sqrt();

    Ok(RouteStatistics {
        expected_value,
        variance,
        confidence,
    })
}
