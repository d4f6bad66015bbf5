//! Drives the waypoint updater around a simulated loop track.
//!
//! A stop signal is raised part way round and withdrawn once the vehicle has
//! been standing for a while, so both the braking and the pull-away ramps show
//! up in the log.

use anyhow::{Context, Result};
use std::f64::consts::TAU;
use std::path::Path;
use tracing::info;
use waypoint_updater::config::UpdaterConfig;
use waypoint_updater::{Mode, RoutePoint, StopSignal, TrajectoryWindow, VehiclePose, WaypointUpdater};

const TRACK_RADIUS: f64 = 100.0;
const TRACK_POINTS: usize = 80;
const ROUTE_SPEED: f64 = 11.11;
const VEHICLE_ACCEL: f64 = 4.0;
const STOP_AHEAD: usize = 25;
const RED_LIGHT_CYCLE: usize = 150;
const GREEN_AFTER_STANDSTILL: usize = 60;
const TOTAL_CYCLES: usize = 1500;

/// Vehicle moving along the route polyline
struct SimVehicle {
    route: Vec<RoutePoint>,
    arc: f64,
    speed: f64,
}

impl SimVehicle {
    fn segment_length(&self, i: usize) -> f64 {
        let a = &self.route[i % self.route.len()];
        let b = &self.route[(i + 1) % self.route.len()];
        (b.position - a.position).norm()
    }

    fn pose(&self) -> VehiclePose {
        let mut remaining = self.arc;
        let mut i = 0;
        while remaining > self.segment_length(i) {
            remaining -= self.segment_length(i);
            i = (i + 1) % self.route.len();
        }
        let a = &self.route[i];
        let b = &self.route[(i + 1) % self.route.len()];
        let direction = b.position - a.position;
        let t = remaining / direction.norm();
        let position = a.position + direction * t;
        VehiclePose::planar(position.x, position.y, direction.y.atan2(direction.x))
    }

    fn advance(&mut self, target_speed: f64, dt: f64) {
        let max_change = VEHICLE_ACCEL * dt;
        self.speed += (target_speed - self.speed).clamp(-max_change, max_change);
        self.speed = self.speed.max(0.0);
        self.arc += self.speed * dt;

        let lap: f64 = (0..self.route.len()).map(|i| self.segment_length(i)).sum();
        self.arc %= lap;
    }
}

fn loop_track() -> Vec<RoutePoint> {
    (0..TRACK_POINTS)
        .map(|i| {
            let angle = TAU * i as f64 / TRACK_POINTS as f64;
            RoutePoint::planar(
                TRACK_RADIUS * angle.cos(),
                TRACK_RADIUS * angle.sin(),
                ROUTE_SPEED,
            )
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waypoint_updater=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => UpdaterConfig::load(Path::new(path))
            .with_context(|| format!("loading configuration from {}", path))?,
        None => UpdaterConfig::default(),
    };
    let dt = 1.0 / config.rate_hz;

    info!("Initializing waypoint updater simulation...");
    let mut updater = WaypointUpdater::new(config)?;
    let state = updater.shared_state();

    let route = loop_track();
    state.load_route(route.clone());

    let mut vehicle = SimVehicle {
        route,
        arc: 0.0,
        speed: 0.0,
    };
    let mut latest: Option<TrajectoryWindow> = None;
    let mut standstill_cycles = 0;
    let mut stop_raised = false;

    for cycle in 0..TOTAL_CYCLES {
        state.update_pose(vehicle.pose());
        state.update_velocity(vehicle.speed);

        if cycle == RED_LIGHT_CYCLE {
            let stop_index = (vehicle.arc / vehicle.segment_length(0)) as usize + STOP_AHEAD;
            let stop_index = stop_index % TRACK_POINTS;
            info!("Red light at waypoint {}", stop_index);
            state.update_stop_signal(StopSignal::At(stop_index));
            stop_raised = true;
        }

        if let Err(err) = updater.run_cycle(&mut |window: TrajectoryWindow| latest = Some(window)) {
            info!("Cycle {} skipped: {}", cycle, err);
        }

        let target = latest
            .as_ref()
            .and_then(|w| w.points.first())
            .map_or(0.0, |p| p.target_speed);
        vehicle.advance(target, dt);

        if stop_raised && updater.mode() == Mode::Braking && vehicle.speed == 0.0 {
            standstill_cycles += 1;
            if standstill_cycles == GREEN_AFTER_STANDSTILL {
                info!("Light turned green after {} cycles at rest", standstill_cycles);
                state.update_stop_signal(StopSignal::None);
                stop_raised = false;
            }
        }

        if cycle % 30 == 0 {
            info!(
                "cycle={} mode={:?} speed={:.2} target={:.2} arc={:.1}",
                cycle,
                updater.mode(),
                vehicle.speed,
                target,
                vehicle.arc
            );
        }
    }

    info!("Simulation finished");
    Ok(())
}
