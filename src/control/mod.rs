//! Trajectory window generation
//!
//! One call to [`TrajectoryWindowGenerator::step`] is one cycle: locate the
//! vehicle on the route, pick the mode, cut the window and shape its speeds.
pub mod mode;
pub mod velocity_profile;

use self::mode::{ModeController, StopTarget};
use self::velocity_profile::{AccelerationProfile, DecelerationProfile, VelocityProfile};
use crate::common::{distance, Mode, StopSignal, TrajectoryWindow};
use crate::config::UpdaterConfig;
use crate::error::{ConfigError, CycleError};
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::navigation::route::Route;
use crate::navigation::window;
use crate::perception::localization::Localizer;
use crate::shared::Snapshot;
use tracing::debug;

/// Builds one trajectory window per cycle
#[derive(Debug)]
pub struct TrajectoryWindowGenerator {
    base: LifecycleNodeBase,
    config: UpdaterConfig,
    localizer: Localizer,
    mode: ModeController,
    sequence: u64,
}

impl TrajectoryWindowGenerator {
    /// Create an unconfigured generator
    pub fn new(config: UpdaterConfig) -> Self {
        let mode = ModeController::new(&config);
        TrajectoryWindowGenerator {
            base: LifecycleNodeBase::new("trajectory_window_generator"),
            config,
            localizer: Localizer::new(),
            mode,
            sequence: 0,
        }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Mode chosen in the most recent cycle
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn mode_controller(&self) -> &ModeController {
        &self.mode
    }

    /// Run one cycle over `snapshot`
    ///
    /// Rejected cycles leave the mode untouched.
    pub fn step(&mut self, snapshot: &Snapshot) -> Result<TrajectoryWindow, CycleError> {
        if self.base.get_state() != State::Active {
            return Err(CycleError::Inactive);
        }

        let route = snapshot.route.as_deref().ok_or(CycleError::RouteUnavailable)?;
        let pose = snapshot.pose.as_ref().ok_or(CycleError::PoseUnavailable)?;
        if !pose.position.coords.iter().all(|c| c.is_finite()) {
            return Err(CycleError::NonFinitePose);
        }

        if route.len() < 2 {
            return Err(CycleError::DegenerateRoute { len: route.len() });
        }

        let stop = resolve_stop(snapshot.stop, route, &pose.position)?;
        let next_index = self
            .localizer
            .next_index(pose, route)
            .ok_or(CycleError::DegenerateRoute { len: route.len() })?;

        let plan = self.mode.decide(pose, snapshot.velocity, next_index, stop);
        let mut points = window::extract(route, plan.start, plan.end);

        let profile = self.profile_for(plan.mode);
        profile.apply(&mut points);

        debug!(
            "Window {}: {:?} from {} to {} ({} points, {})",
            self.sequence,
            plan.mode,
            plan.start,
            plan.end % route.len(),
            points.len(),
            profile.name()
        );

        let window = TrajectoryWindow {
            frame_id: self.config.frame_id.clone(),
            sequence: self.sequence,
            mode: plan.mode,
            points,
        };
        self.sequence += 1;
        Ok(window)
    }

    fn profile_for(&self, mode: Mode) -> Box<dyn VelocityProfile> {
        match mode {
            Mode::Cruise => Box::new(AccelerationProfile::new(
                self.config.accel_rate,
                self.mode.acceleration_origin(),
            )),
            Mode::Braking => Box::new(DecelerationProfile::new(
                self.config.decel_rate,
                self.config.stop_buffer,
            )),
        }
    }
}

fn resolve_stop(
    signal: StopSignal,
    route: &Route,
    position: &nalgebra::Point3<f64>,
) -> Result<Option<StopTarget>, CycleError> {
    let Some(index) = signal.index() else {
        return Ok(None);
    };
    // No modulo here: an index past the end is the producer's mistake, not a wrap.
    let stop_point = route
        .points()
        .get(index)
        .ok_or(CycleError::StopIndexOutOfRange {
            index,
            len: route.len(),
        })?;
    Ok(Some(StopTarget {
        index,
        distance: distance(position, &stop_point.position),
    }))
}

impl LifecycleNode for TrajectoryWindowGenerator {
    fn on_configure(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.mode = ModeController::new(&self.config);
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_activate(&mut self) {
        self.base.set_state(State::Active);
    }

    fn on_deactivate(&mut self) {
        self.mode.reset();
        self.base.set_state(State::Inactive);
    }

    fn on_cleanup(&mut self) {
        self.base.set_state(State::Unconfigured);
    }

    fn on_shutdown(&mut self) {
        self.mode.reset();
        self.base.set_state(State::Finalized);
    }

    fn state(&self) -> State {
        self.base.get_state()
    }
}
