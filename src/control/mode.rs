//! Cruise/braking mode decision
//!
//! Once braking has started the controller keeps braking until the stop
//! signal is withdrawn. It never re-checks whether the stop is still
//! comfortable, which keeps the mode from flickering while the distance
//! estimate hovers around the threshold.
//!
//! The reverse also holds: a vehicle that is already too close to stop
//! comfortably when the signal appears keeps cruising and is not re-checked
//! as the distance shrinks. That means such a vehicle will pass the stop
//! point. This is deliberate, but it is a safety-relevant choice.

use crate::common::{Mode, VehiclePose};
use crate::config::UpdaterConfig;
use nalgebra::Point3;
use tracing::{debug, info};

/// Active stop request resolved against the route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopTarget {
    pub index: usize,
    /// Straight-line distance from the vehicle to the stop point
    pub distance: f64,
}

/// Route range to emit and how to shape it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    pub mode: Mode,
    pub start: usize,
    /// Inclusive; may be smaller than `start` when the window wraps
    pub end: usize,
}

/// Persistent mode state carried across cycles
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: Mode,
    acceleration_origin: Option<Point3<f64>>,
    lookahead: usize,
    max_decel: f64,
    stop_buffer: f64,
    standstill_speed: f64,
}

impl ModeController {
    pub fn new(config: &UpdaterConfig) -> Self {
        ModeController {
            mode: Mode::Cruise,
            acceleration_origin: None,
            lookahead: config.lookahead_wps.max(1),
            max_decel: config.max_decel,
            stop_buffer: config.stop_buffer,
            standstill_speed: config.standstill_speed,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Where the vehicle last stood still while cruising
    pub fn acceleration_origin(&self) -> Option<Point3<f64>> {
        self.acceleration_origin
    }

    /// Distance needed to stop from `speed` at the deceleration limit, plus the buffer
    pub fn min_stopping_distance(&self, speed: f64) -> f64 {
        speed * speed / (2.0 * self.max_decel) + self.stop_buffer
    }

    /// Back to cruising with no acceleration origin
    pub fn reset(&mut self) {
        self.mode = Mode::Cruise;
        self.acceleration_origin = None;
    }

    /// Decide this cycle's mode and window
    pub fn decide(
        &mut self,
        pose: &VehiclePose,
        speed: f64,
        next_index: usize,
        stop: Option<StopTarget>,
    ) -> WindowPlan {
        let Some(stop) = stop else {
            if self.mode == Mode::Braking {
                info!("Stop signal cleared, resuming cruise");
            }
            return self.cruise(pose, speed, next_index);
        };

        if self.mode == Mode::Cruise {
            let min_stopping = self.min_stopping_distance(speed);
            if stop.distance < min_stopping {
                debug!(
                    "Stop at {} is {:.2} m away, needs {:.2} m; continuing",
                    stop.index, stop.distance, min_stopping
                );
                return self.cruise(pose, speed, next_index);
            }
            info!(
                "Braking for stop at waypoint {} ({:.2} m ahead)",
                stop.index, stop.distance
            );
        }

        self.mode = Mode::Braking;
        self.acceleration_origin = None;
        WindowPlan {
            mode: Mode::Braking,
            start: next_index,
            end: stop.index,
        }
    }

    fn cruise(&mut self, pose: &VehiclePose, speed: f64, next_index: usize) -> WindowPlan {
        self.mode = Mode::Cruise;
        if speed <= self.standstill_speed {
            self.acceleration_origin = Some(pose.position);
        }
        WindowPlan {
            mode: Mode::Cruise,
            start: next_index,
            end: next_index.saturating_add(self.lookahead - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> ModeController {
        ModeController::new(&UpdaterConfig::default())
    }

    fn pose() -> VehiclePose {
        VehiclePose::planar(1.0, 2.0, 0.0)
    }

    #[test]
    fn min_stopping_distance_uses_decel_limit_and_buffer() {
        assert_relative_eq!(controller().min_stopping_distance(10.0), 15.0);
        assert_relative_eq!(controller().min_stopping_distance(0.0), 2.5);
    }

    #[test]
    fn no_stop_means_cruise_window() {
        let mut mode = controller();
        let plan = mode.decide(&pose(), 5.0, 7, None);
        assert_eq!(
            plan,
            WindowPlan {
                mode: Mode::Cruise,
                start: 7,
                end: 106
            }
        );
    }

    #[test]
    fn far_stop_starts_braking() {
        let mut mode = controller();
        let stop = StopTarget { index: 3, distance: 50.0 };
        let plan = mode.decide(&pose(), 10.0, 1, Some(stop));
        assert_eq!(plan.mode, Mode::Braking);
        assert_eq!((plan.start, plan.end), (1, 3));
        assert_eq!(mode.mode(), Mode::Braking);
    }

    #[test]
    fn stop_too_close_keeps_cruising() {
        let mut mode = controller();
        let stop = StopTarget { index: 3, distance: 10.0 };
        let plan = mode.decide(&pose(), 10.0, 1, Some(stop));
        assert_eq!(plan.mode, Mode::Cruise);
        assert_eq!(plan.end, 100);
    }

    #[test]
    fn braking_is_not_abandoned_when_stop_gets_close() {
        let mut mode = controller();
        mode.decide(&pose(), 10.0, 1, Some(StopTarget { index: 3, distance: 50.0 }));
        let plan = mode.decide(&pose(), 10.0, 2, Some(StopTarget { index: 3, distance: 1.0 }));
        assert_eq!(plan.mode, Mode::Braking);
    }

    #[test]
    fn only_clearing_the_signal_ends_braking() {
        let mut mode = controller();
        let far = StopTarget { index: 9, distance: 80.0 };
        mode.decide(&pose(), 10.0, 1, Some(far));
        for distance in [60.0, 20.0, 5.0, 0.5, 0.0] {
            let stop = StopTarget { index: 9, distance };
            mode.decide(&pose(), 0.0, 8, Some(stop));
            assert_eq!(mode.mode(), Mode::Braking);
        }
        mode.decide(&pose(), 0.0, 8, None);
        assert_eq!(mode.mode(), Mode::Cruise);
    }

    #[test]
    fn origin_is_recorded_at_standstill_while_cruising() {
        let mut mode = controller();
        mode.decide(&pose(), 3.0, 0, None);
        assert_eq!(mode.acceleration_origin(), None);
        mode.decide(&pose(), 0.0, 0, None);
        assert_eq!(mode.acceleration_origin(), Some(pose().position));
        // Still kept once the vehicle is moving again.
        mode.decide(&VehiclePose::planar(5.0, 2.0, 0.0), 2.0, 1, None);
        assert_eq!(mode.acceleration_origin(), Some(pose().position));
    }

    #[test]
    fn braking_clears_origin() {
        let mut mode = controller();
        mode.decide(&pose(), 0.0, 0, None);
        mode.decide(&pose(), 0.0, 0, Some(StopTarget { index: 5, distance: 40.0 }));
        assert_eq!(mode.acceleration_origin(), None);
    }

    #[test]
    fn cruise_window_end_does_not_overflow() {
        let config = UpdaterConfig {
            lookahead_wps: usize::MAX,
            ..UpdaterConfig::default()
        };
        let mut mode = ModeController::new(&config);
        let plan = mode.decide(&pose(), 5.0, 3, None);
        assert_eq!(plan.end, usize::MAX);
    }

    #[test]
    fn reset_returns_to_cruise() {
        let mut mode = controller();
        mode.decide(&pose(), 10.0, 1, Some(StopTarget { index: 3, distance: 50.0 }));
        mode.reset();
        assert_eq!(mode.mode(), Mode::Cruise);
    }
}
