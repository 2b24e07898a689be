//! Greedy nearest-neighbor route construction with geometric and statistical
//! candidate pruning.
//!
//! This is a fast approximation, not a TSP solver: each step picks the
//! nearest surviving candidate, and the pruning filters exist to suppress
//! backtracking zig-zags and statistical outlier hops.

use std::time::Duration;

use crate::error::NavError;
use crate::models::{Route, RouteStatistics, Waypoint};
use crate::spatial::planar_distance;
use crate::stats::compute_statistics;

/// Bias applied to the triangle-inequality viability test. Values below 1.0
/// shrink the allowance for detours relative to the direct hop.
const BIAS_WEIGHT: f64 = 0.95;

/// Seconds of estimated travel per unit of planar distance. A placeholder
/// average-speed conversion, not a calibrated speed model.
const SECS_PER_DISTANCE_UNIT: f64 = 3600.0;

/// Build an ordered route visiting every input waypoint exactly once,
/// starting from the first.
///
/// Candidates at each step must pass a triangle-inequality viability test
/// against the previous edge and must not exceed the statistical hop ceiling
/// `expected_value * (1 + variance)`. When both filters reject every
/// unvisited waypoint, selection falls back to the plain nearest neighbor,
/// so planning always completes.
///
/// Fails with [`NavError::EmptyInput`] on an empty set. A single waypoint
/// yields a zero-distance, zero-duration route.
pub fn plan_route(waypoints: &[Waypoint]) -> Result<Route, NavError> {
    if waypoints.is_empty() {
        return Err(NavError::EmptyInput);
    }
    if waypoints.len() == 1 {
        return Ok(Route {
            waypoints: waypoints.to_vec(),
            total_distance: 0.0,
            duration: Duration::ZERO,
        });
    }

    let stats = compute_statistics(waypoints)?;

    let n = waypoints.len();
    let mut visited = vec![false; n];
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut total_distance = 0.0;

    order.push(0);
    visited[0] = true;
    let mut current = 0;

    for step in 0..n - 1 {
        let prev = (step >= 1).then(|| order[step - 1]);
        let Some((next, dist)) = select_candidate(waypoints, &visited, current, prev, &stats)
            .or_else(|| nearest_unvisited(waypoints, &visited, current))
        else {
            break;
        };

        visited[next] = true;
        order.push(next);
        total_distance += dist;
        current = next;
    }

    Ok(Route {
        waypoints: order.into_iter().map(|i| waypoints[i].clone()).collect(),
        total_distance,
        duration: Duration::from_secs_f64(total_distance * SECS_PER_DISTANCE_UNIT),
    })
}

/// Nearest unvisited candidate passing both pruning filters, if any survives.
fn select_candidate(
    waypoints: &[Waypoint],
    visited: &[bool],
    current: usize,
    prev: Option<usize>,
    stats: &RouteStatistics,
) -> Option<(usize, f64)> {
    let hop_ceiling = stats.expected_value * (1.0 + stats.variance);
    let mut best: Option<(usize, f64)> = None;

    for (idx, candidate) in waypoints.iter().enumerate() {
        if visited[idx] {
            continue;
        }
        if let Some(prev) = prev {
            if !edge_viable(&waypoints[prev], &waypoints[current], candidate) {
                continue;
            }
        }
        let dist = planar_distance(&waypoints[current], candidate);
        if dist > hop_ceiling {
            continue;
        }
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((idx, dist));
        }
    }

    best
}

/// Triangle-inequality viability: the direct distance from the
/// previous-to-last node to the candidate must not exceed the biased two-leg
/// detour through the last node.
fn edge_viable(prev: &Waypoint, last: &Waypoint, candidate: &Waypoint) -> bool {
    let direct = planar_distance(prev, candidate);
    let detour = planar_distance(prev, last) + planar_distance(last, candidate);
    direct <= detour * BIAS_WEIGHT
}

/// Unfiltered nearest neighbor over all unvisited waypoints.
fn nearest_unvisited(
    waypoints: &[Waypoint],
    visited: &[bool],
    current: usize,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in waypoints.iter().enumerate() {
        if visited[idx] {
            continue;
        }
        let dist = planar_distance(&waypoints[current], candidate);
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((idx, dist));
        }
    }
    best
}
