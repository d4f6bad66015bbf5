pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod lifecycle;
pub mod navigation;
pub mod output;
pub mod perception;
pub mod shared;

use crate::config::UpdaterConfig;
use crate::control::TrajectoryWindowGenerator;
use crate::error::{ConfigError, CycleError};
use crate::lifecycle::LifecycleNode;
use crate::output::TrajectorySink;
use crate::shared::SharedState;
use std::future::Future;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub use crate::common::{
    Mode, RoutePoint, StopSignal, TrajectoryPoint, TrajectoryWindow, VehiclePose,
};

/// Waypoint updater: shared inputs plus the per-cycle window generator
pub struct WaypointUpdater {
    state: Arc<SharedState>,
    generator: TrajectoryWindowGenerator,
}

impl WaypointUpdater {
    /// Create an active updater with empty inputs
    pub fn new(config: UpdaterConfig) -> Result<Self, ConfigError> {
        let mut generator = TrajectoryWindowGenerator::new(config);
        generator.on_configure()?;
        generator.on_activate();
        Ok(WaypointUpdater {
            state: Arc::new(SharedState::new()),
            generator,
        })
    }

    /// Handle for the tasks that feed pose, velocity, route and signals
    pub fn shared_state(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    pub fn generator(&self) -> &TrajectoryWindowGenerator {
        &self.generator
    }

    pub fn mode(&self) -> Mode {
        self.generator.mode()
    }

    /// Run a single cycle and publish its window
    ///
    /// Nothing is published when the cycle is rejected.
    pub fn run_cycle<S>(&mut self, sink: &mut S) -> Result<(), CycleError>
    where
        S: TrajectorySink + ?Sized,
    {
        let snapshot = self.state.snapshot();
        let window = self.generator.step(&snapshot)?;
        sink.publish(window);
        Ok(())
    }

    /// Run cycles at the configured rate until `shutdown` completes
    pub async fn run<S, F>(mut self, mut sink: S, shutdown: F)
    where
        S: TrajectorySink,
        F: Future<Output = ()>,
    {
        let period = match self.generator.config().cycle_period() {
            Ok(period) => period,
            Err(err) => {
                error!("Cannot start cycle loop: {}", err);
                self.generator.on_shutdown();
                return;
            }
        };
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);
        info!("Waypoint updater running every {:?}", period);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = self.run_cycle(&mut sink) {
                        log_skipped_cycle(&err);
                    }
                }
            }
        }

        self.generator.on_deactivate();
        self.generator.on_cleanup();
        self.generator.on_shutdown();
    }
}

fn log_skipped_cycle(err: &CycleError) {
    if err.is_waiting_for_input() {
        debug!("Skipping cycle: {}", err);
    } else {
        warn!("Rejecting cycle: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ChannelSink;
    use tokio::sync::oneshot;

    fn straight_route(n: usize) -> Vec<RoutePoint> {
        (0..n)
            .map(|i| RoutePoint::planar(10.0 * i as f64, 0.0, 10.0))
            .collect()
    }

    #[test]
    fn cycle_without_inputs_publishes_nothing() {
        let mut updater = WaypointUpdater::new(UpdaterConfig::default()).unwrap();
        let mut published = 0;
        let result = updater.run_cycle(&mut |_: TrajectoryWindow| published += 1);
        assert_eq!(result, Err(CycleError::RouteUnavailable));
        assert_eq!(published, 0);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = UpdaterConfig {
            lookahead_wps: 0,
            ..UpdaterConfig::default()
        };
        assert!(WaypointUpdater::new(config).is_err());
    }

    #[test]
    fn cycle_uses_latest_inputs() {
        let mut updater = WaypointUpdater::new(UpdaterConfig::default()).unwrap();
        let state = updater.shared_state();
        state.load_route(straight_route(20));
        state.update_pose(VehiclePose::planar(0.0, 0.0, 0.0));
        state.update_velocity(8.0);

        let mut windows = Vec::new();
        updater.run_cycle(&mut |w: TrajectoryWindow| windows.push(w)).unwrap();
        state.update_stop_signal(StopSignal::At(15));
        updater.run_cycle(&mut |w: TrajectoryWindow| windows.push(w)).unwrap();

        assert_eq!(windows[0].mode, Mode::Cruise);
        assert_eq!(windows[0].len(), 100);
        assert_eq!(windows[1].mode, Mode::Braking);
        assert_eq!(windows[1].len(), 15);
        assert_eq!(updater.mode(), Mode::Braking);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_publishes_until_shutdown() {
        let updater = WaypointUpdater::new(UpdaterConfig::default()).unwrap();
        let state = updater.shared_state();
        state.load_route(straight_route(5));
        state.update_pose(VehiclePose::planar(0.0, 0.0, 0.0));

        let (sink, mut receiver) = ChannelSink::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(updater.run(sink, async move {
            let _ = stop_rx.await;
        }));

        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!(first.sequence + 1, second.sequence);

        stop_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_running_through_rejected_cycles() {
        let updater = WaypointUpdater::new(UpdaterConfig::default()).unwrap();
        let state = updater.shared_state();
        state.load_route(straight_route(5));
        state.update_pose(VehiclePose::planar(0.0, 0.0, 0.0));
        state.update_stop_signal(StopSignal::At(99));

        let (sink, mut receiver) = ChannelSink::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(updater.run(sink, async move {
            let _ = stop_rx.await;
        }));

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(receiver.try_recv().is_err());

        state.update_stop_signal(StopSignal::None);
        let window = receiver.recv().await.unwrap();
        assert_eq!(window.mode, Mode::Cruise);

        stop_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
