//! Error taxonomy for planning and progress tracking.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// Pairwise statistics need at least two waypoints.
    #[error("need at least 2 waypoints for statistics, got {0}")]
    InsufficientData(usize),
    /// Planning was requested over an empty waypoint set.
    #[error("cannot plan a route over an empty waypoint set")]
    EmptyInput,
    /// Progress is undefined against a route with zero total distance.
    #[error("route has zero total distance")]
    DegenerateRoute,
}
