//! Autonav agent - adaptive vehicle control loop daemon.

mod config;
mod events;
mod loops;
mod policy;
mod sensors;
mod store;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autonav_core::models::Waypoint;
use autonav_core::planner::plan_route;

use crate::config::Config;
use crate::events::EventLog;
use crate::loops::control_loop::{run_control_loop, LoopContext};
use crate::sensors::{SensorProvider, SyntheticSensors};
use crate::store::{init_state, StateStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("autonav_agent=debug".parse()?),
        )
        .init();

    tracing::info!("starting autonav agent");

    let config = Config::from_env();
    let store = StateStore::new(&config.state_path);
    let events = EventLog::new(&config.event_log_path);

    let mut state = init_state(&store, &events);

    // A provider that cannot produce a single reading is unrecoverable.
    let mut sensors = SyntheticSensors::new();
    sensors
        .read()
        .context("sensor provider failed the startup reading")?;

    if state.active_route.is_none() {
        match plan_route(&seed_waypoints()) {
            Ok(route) => {
                tracing::info!(
                    "seeded initial route over {} waypoints ({:.2} distance units)",
                    route.len(),
                    route.total_distance,
                );
                state.active_route = Some(route);
            }
            Err(err) => tracing::warn!("initial route planning failed: {}", err),
        }
    }

    let (shutdown_tx, _) = broadcast::channel(1);
    let (snapshot_tx, snapshot_rx) = watch::channel(state.clone());

    let ctx = LoopContext {
        sensors: Box::new(sensors),
        store,
        events: events.clone(),
        snapshot: snapshot_tx,
        tick_interval: config.tick_interval,
    };
    let loop_handle = tokio::spawn(run_control_loop(state, ctx, shutdown_tx.subscribe()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for the shutdown signal")?;
    tracing::info!("shutdown signal received");
    let _ = shutdown_tx.send(());
    loop_handle.await?;

    let iterations = snapshot_rx.borrow().iteration_count;
    events.emit("agent shutdown complete");
    tracing::info!("shutdown complete after {} iterations", iterations);
    Ok(())
}

/// Demo waypoint set used when no persisted route exists.
fn seed_waypoints() -> Vec<Waypoint> {
    vec![
        Waypoint::labeled(40.7128, -74.0060, "New York"),
        Waypoint::labeled(34.0522, -118.2437, "Los Angeles"),
        Waypoint::labeled(41.8781, -87.6298, "Chicago"),
    ]
}
