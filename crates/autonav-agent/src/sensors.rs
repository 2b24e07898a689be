//! Sensor acquisition seam.

use autonav_core::SensorReading;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of per-tick sensor snapshots.
///
/// Implementations must return promptly; the control loop does no buffering
/// or retrying within a tick.
pub trait SensorProvider: Send {
    fn read(&mut self) -> Result<SensorReading, SensorError>;
}

/// Synthetic readings for development runs and tests: fixed base values with
/// small jitter, rotating through a handful of scene labels so the
/// novel-scenario path gets exercised.
pub struct SyntheticSensors {
    reads: u64,
    scene_hold_reads: u64,
    scenes: Vec<&'static str>,
    base_lat: f64,
    base_lon: f64,
}

const SCENES: [&str; 3] = [
    "highway lane change detected",
    "merging traffic ahead",
    "clear highway cruise",
];

impl SyntheticSensors {
    pub fn new() -> Self {
        Self::with_scene_hold(400)
    }

    /// Rotate to the next scene label every `scene_hold_reads` readings.
    pub fn with_scene_hold(scene_hold_reads: u64) -> Self {
        Self {
            reads: 0,
            scene_hold_reads: scene_hold_reads.max(1),
            scenes: SCENES.to_vec(),
            base_lat: 40.7128,
            base_lon: -74.0060,
        }
    }
}

impl Default for SyntheticSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorProvider for SyntheticSensors {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        let mut rng = rand::rng();
        let scene_idx = ((self.reads / self.scene_hold_reads) as usize) % self.scenes.len();
        self.reads += 1;

        Ok(SensorReading {
            steering_angle: 2.5 + rng.random_range(-0.2..0.2),
            brake_force: 0.8 + rng.random_range(-0.1..0.1),
            scene: self.scenes[scene_idx].to_string(),
            orientation: [
                0.01 + rng.random_range(-0.005..0.005),
                0.02 + rng.random_range(-0.005..0.005),
            ],
            lat: self.base_lat + rng.random_range(-0.0005..0.0005),
            lon: self.base_lon + rng.random_range(-0.0005..0.0005),
        })
    }
}
