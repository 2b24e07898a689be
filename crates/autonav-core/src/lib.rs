pub mod error;
pub mod models;
pub mod planner;
pub mod progress;
pub mod spatial;
pub mod stats;

pub use error::NavError;
pub use models::{Route, RouteStatistics, SensorReading, VehicleState, Waypoint};
pub use planner::plan_route;
pub use progress::{next_waypoint, route_progress};
pub use spatial::{bearing_deg, normalize_heading_deg, planar_distance};
pub use stats::compute_statistics;
