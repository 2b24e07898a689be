//! Periodic vehicle control loop.
//!
//! One sensor snapshot per tick drives the adaptive state update, route
//! progress tracking, deviation-triggered re-planning, and a heading
//! correction toward the next waypoint. The state is persisted after every
//! mutation. The loop is idle until spawned, running until the shutdown
//! signal, and terminated once it returns.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, MissedTickBehavior};

use autonav_core::models::{Route, SensorReading, VehicleState, Waypoint};
use autonav_core::planner::plan_route;
use autonav_core::progress::{next_waypoint, route_progress};
use autonav_core::spatial::{bearing_deg, normalize_heading_deg};
use autonav_core::stats::compute_statistics;

use crate::events::EventLog;
use crate::policy;
use crate::sensors::SensorProvider;
use crate::store::StateStore;

/// Confidence floor below which a progress deviation never triggers a
/// re-plan.
const REPLAN_CONFIDENCE_FLOOR: f64 = 0.95;

/// Everything the control loop owns besides the vehicle state itself.
pub struct LoopContext {
    pub sensors: Box<dyn SensorProvider>,
    pub store: StateStore,
    pub events: EventLog,
    /// Immutable state snapshots for out-of-loop diagnostics.
    pub snapshot: watch::Sender<VehicleState>,
    pub tick_interval: Duration,
}

pub async fn run_control_loop(
    mut state: VehicleState,
    mut ctx: LoopContext,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(ctx.tick_interval);
    // A tick whose work overruns the period drops the missed ticks instead
    // of running them back to back.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("control loop shutting down");
                ctx.events.emit("control loop terminated");
                break;
            }
            _ = ticker.tick() => {
                let reading = match ctx.sensors.read() {
                    Ok(reading) => reading,
                    Err(err) => {
                        tracing::warn!("sensor read failed, skipping tick: {}", err);
                        continue;
                    }
                };
                run_tick(&mut state, &reading, &ctx.store, &ctx.events);
                let _ = ctx.snapshot.send(state.clone());
            }
        }
    }
}

/// One complete control tick over an exclusively borrowed state.
fn run_tick(state: &mut VehicleState, reading: &SensorReading, store: &StateStore, events: &EventLog) {
    if reading.scene != state.last_scene {
        state.last_scene = reading.scene.clone();
        events.emit(&format!("novel driving scenario: {}", reading.scene));
        persist(state, store);
    }

    state.iteration_count += 1;
    state.last_steering_correction = policy::steering_correction(reading.steering_angle);
    state.last_brake_intensity = policy::brake_intensity(reading.brake_force);

    if state.active_route.is_some() {
        track_route(state, reading, events);
    }

    persist(state, store);
    events.emit(&format!(
        "iteration: {} | steering: {:.2} | brake: {:.2} | scene: {} | progress: {:.2}",
        state.iteration_count,
        state.last_steering_correction,
        state.last_brake_intensity,
        state.last_scene,
        state.route_progress,
    ));
}

/// Track progress along the active route, re-planning on deviation, and
/// steer toward the next waypoint.
fn track_route(state: &mut VehicleState, reading: &SensorReading, events: &EventLog) {
    let position = reading.position();

    let (progress, deviated) = {
        let Some(route) = state.active_route.as_ref() else {
            return;
        };
        let progress = match route_progress(&position, route) {
            Ok(progress) => progress,
            Err(err) => {
                tracing::warn!("route progress unavailable: {}", err);
                return;
            }
        };
        let deviated = match compute_statistics(&route.waypoints) {
            // Progress is a unitless fraction while expected_value and
            // variance are coordinate-degree quantities; the trigger
            // compares them directly regardless.
            Ok(stats) => {
                (progress - stats.expected_value).abs() > stats.variance
                    && stats.confidence > REPLAN_CONFIDENCE_FLOOR
            }
            Err(err) => {
                tracing::debug!("route statistics unavailable: {}", err);
                false
            }
        };
        (progress, deviated)
    };

    if deviated {
        replan(state, &position, progress, events);
    }

    state.route_progress = progress;

    if let Some(route) = state.active_route.as_ref() {
        if let Some(target) = next_waypoint(route, progress) {
            let heading_error =
                normalize_heading_deg(bearing_deg(&position, target) - reading.heading_deg());
            let correction = policy::heading_correction(heading_error);
            events.emit(&format!("steering correction: {:.2} degrees", correction));
        }
    }
}

/// Re-plan from the current position over the not-yet-reached tail of the
/// active route. Planning failure keeps the previous route.
fn replan(state: &mut VehicleState, position: &Waypoint, progress: f64, events: &EventLog) {
    let points = {
        let Some(route) = state.active_route.as_ref() else {
            return;
        };
        let from = remaining_index(route, progress);
        let mut points = Vec::with_capacity(route.waypoints.len() - from + 1);
        points.push(position.clone());
        points.extend(route.waypoints[from..].iter().cloned());
        points
    };

    match plan_route(&points) {
        Ok(new_route) => {
            state.active_route = Some(new_route);
            events.emit("route re-optimized after progress deviation");
        }
        Err(err) => {
            tracing::warn!("re-optimization failed, keeping active route: {}", err);
        }
    }
}

/// Index of the first waypoint not yet reached at the given progress.
fn remaining_index(route: &Route, progress: f64) -> usize {
    let n = route.waypoints.len();
    if n < 2 {
        return 0;
    }
    let index = (progress * (n - 1) as f64) as usize;
    (index + 1).min(n - 1)
}

fn persist(state: &mut VehicleState, store: &StateStore) {
    state.updated_at = Utc::now();
    if let Err(err) = store.save(state) {
        tracing::warn!("state persistence failed, continuing: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(tag: &str, ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("autonav-loop-{}-{}.{}", tag, uuid::Uuid::new_v4(), ext))
    }

    fn reading(scene: &str, lat: f64, lon: f64) -> SensorReading {
        SensorReading {
            steering_angle: 2.5,
            brake_force: 0.8,
            scene: scene.to_string(),
            orientation: [0.01, 0.02],
            lat,
            lon,
        }
    }

    fn cleanup(paths: &[PathBuf]) {
        for path in paths {
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn scene_change_emits_one_event_and_one_extra_persist() {
        let state_path = temp_path("scene", "json");
        let log_path = temp_path("scene", "log");
        let store = StateStore::new(&state_path);
        let events = EventLog::new(&log_path);

        let mut state = VehicleState::default();
        state.last_scene = "clear highway cruise".to_string();

        // Same scene: one per-tick persist.
        run_tick(&mut state, &reading("clear highway cruise", 0.0, 0.0), &store, &events);
        assert_eq!(store.save_count(), 1);

        // Changed scene: the novel-scenario persist plus the per-tick persist.
        run_tick(&mut state, &reading("merging traffic ahead", 0.0, 0.0), &store, &events);
        assert_eq!(store.save_count(), 3);

        let log = std::fs::read_to_string(&log_path).unwrap();
        let novel_lines = log
            .lines()
            .filter(|line| line.contains("novel driving scenario"))
            .count();
        assert_eq!(novel_lines, 1);
        assert_eq!(state.iteration_count, 2);
        assert_eq!(state.last_scene, "merging traffic ahead");

        cleanup(&[state_path, log_path]);
    }

    #[test]
    fn corrections_update_from_the_reading() {
        let state_path = temp_path("corr", "json");
        let log_path = temp_path("corr", "log");
        let store = StateStore::new(&state_path);
        let events = EventLog::new(&log_path);

        let mut state = VehicleState::default();
        run_tick(&mut state, &reading("a", 0.0, 0.0), &store, &events);

        assert!((state.last_steering_correction - 2.5 * 1.02).abs() < 1e-12);
        assert!((state.last_brake_intensity - 0.8 * 1.05).abs() < 1e-12);
        assert_eq!(state.iteration_count, 1);

        cleanup(&[state_path, log_path]);
    }

    #[test]
    fn progress_updates_against_the_active_route() {
        let state_path = temp_path("progress", "json");
        let log_path = temp_path("progress", "log");
        let store = StateStore::new(&state_path);
        let events = EventLog::new(&log_path);

        let mut state = VehicleState::default();
        state.active_route = Some(
            plan_route(&[
                Waypoint::new(0.0, 0.0),
                Waypoint::new(0.0, 10.0),
                Waypoint::new(0.0, 20.0),
            ])
            .unwrap(),
        );

        run_tick(&mut state, &reading("a", 0.0, 7.0), &store, &events);
        assert!((state.route_progress - 0.35).abs() < 1e-9);

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("steering correction"));

        cleanup(&[state_path, log_path]);
    }

    #[test]
    fn small_routes_never_trigger_a_replan() {
        // Confidence 1 - 1/sqrt(3) is far below the floor, whatever the
        // deviation.
        let state_path = temp_path("noreplan", "json");
        let log_path = temp_path("noreplan", "log");
        let store = StateStore::new(&state_path);
        let events = EventLog::new(&log_path);

        let mut state = VehicleState::default();
        let route = plan_route(&[
            Waypoint::new(0.0, 0.0),
            Waypoint::new(0.0, 10.0),
            Waypoint::new(0.0, 20.0),
        ])
        .unwrap();
        state.active_route = Some(route.clone());

        run_tick(&mut state, &reading("a", 0.0, 3.0), &store, &events);
        assert_eq!(state.active_route, Some(route));

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(!log.contains("re-optimized"));

        cleanup(&[state_path, log_path]);
    }

    #[test]
    fn deviation_on_a_large_route_replans_from_the_position() {
        // 1 - 1/sqrt(450) > 0.95, and a position at the start deviates from
        // the distance-valued expectation by more than the variance.
        let state_path = temp_path("replan", "json");
        let log_path = temp_path("replan", "log");
        let store = StateStore::new(&state_path);
        let events = EventLog::new(&log_path);

        let points: Vec<Waypoint> = (0..450)
            .map(|i| Waypoint::new(0.0, i as f64 * 0.001))
            .collect();
        let route = plan_route(&points).unwrap();
        let old_len = route.len();

        let mut state = VehicleState::default();
        state.active_route = Some(route);

        run_tick(&mut state, &reading("a", 0.0, 0.0), &store, &events);

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("route re-optimized after progress deviation"));

        // Replacement route: current position plus the unreached tail.
        let new_route = state.active_route.as_ref().unwrap();
        assert_eq!(new_route.len(), old_len);
        assert_eq!(new_route.waypoints[0], Waypoint::new(0.0, 0.0));

        cleanup(&[state_path, log_path]);
    }
}
