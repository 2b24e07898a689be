//! Correction policies applied each control tick.
//!
//! Fixed factors stand in for a learned model. The loop only calls these
//! functions, so a real model can replace them without touching its control
//! flow.

/// Per-iteration steering reinforcement factor.
const STEERING_FACTOR: f64 = 1.02;

/// Per-iteration brake reinforcement factor.
const BRAKE_FACTOR: f64 = 1.05;

/// Proportional gain applied to heading error; no integral or derivative
/// terms.
const HEADING_GAIN: f64 = 0.1;

pub fn steering_correction(steering_angle: f64) -> f64 {
    steering_angle * STEERING_FACTOR
}

pub fn brake_intensity(brake_force: f64) -> f64 {
    brake_force * BRAKE_FACTOR
}

/// Steering output for a heading error already normalized into (-180, 180].
pub fn heading_correction(heading_error_deg: f64) -> f64 {
    heading_error_deg * HEADING_GAIN
}
