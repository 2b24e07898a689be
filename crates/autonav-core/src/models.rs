//! Core data models for the autonav system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A geographic point in signed decimal degrees, optionally named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            label: None,
        }
    }

    pub fn labeled(lat: f64, lon: f64, label: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            label: Some(label.into()),
        }
    }
}

/// An ordered traversal of waypoints plus aggregate distance and duration.
///
/// Produced by the planner and replaced wholesale on re-optimization, never
/// mutated in place. The waypoint sequence is a permutation of the planner's
/// input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    /// Cumulative planar distance over consecutive hops, in coordinate degrees.
    pub total_distance: f64,
    /// Estimated traversal time derived from the total distance.
    pub duration: Duration,
}

impl Route {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Pairwise-distance statistics over a waypoint set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStatistics {
    /// Mean over all unordered pairwise distances.
    pub expected_value: f64,
    /// Population variance of the pairwise distances.
    pub variance: f64,
    /// Sample-size score in [0, 1); grows toward 1 with the waypoint count.
    pub confidence: f64,
}

/// Persistent adaptive state exclusively owned by the control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub iteration_count: u64,
    pub last_steering_correction: f64,
    pub last_brake_intensity: f64,
    #[serde(default)]
    pub last_scene: String,
    #[serde(default)]
    pub active_route: Option<Route>,
    /// Fractional completion of the active route, in [0, 1].
    pub route_progress: f64,
    pub updated_at: DateTime<Utc>,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            iteration_count: 0,
            last_steering_correction: 0.0,
            last_brake_intensity: 0.0,
            last_scene: String::new(),
            active_route: None,
            route_progress: 0.0,
            updated_at: Utc::now(),
        }
    }
}

/// One sensor snapshot, consumed by a single control tick and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub steering_angle: f64,
    pub brake_force: f64,
    pub scene: String,
    /// Planar orientation vector; heading = atan2(y, x).
    pub orientation: [f64; 2],
    pub lat: f64,
    pub lon: f64,
}

impl SensorReading {
    /// Current position as an unlabeled waypoint.
    pub fn position(&self) -> Waypoint {
        Waypoint::new(self.lat, self.lon)
    }

    /// Heading in degrees derived from the orientation vector.
    pub fn heading_deg(&self) -> f64 {
        self.orientation[1].atan2(self.orientation[0]).to_degrees()
    }
}
