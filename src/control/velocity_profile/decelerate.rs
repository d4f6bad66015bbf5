//! Deceleration ramp to a stop at the end of the window

use super::{ramp_speed, VelocityProfile};
use crate::common::{distance, TrajectoryPoint};

/// Brings the window to rest at its last point
///
/// Each point is capped at `sqrt(2 * rate * max(0, d - stop_buffer))` where `d`
/// is its distance to the last point, so the vehicle is already stopped
/// `stop_buffer` before the stop point.
#[derive(Debug, Clone)]
pub struct DecelerationProfile {
    rate: f64,
    stop_buffer: f64,
}

impl DecelerationProfile {
    pub fn new(rate: f64, stop_buffer: f64) -> Self {
        DecelerationProfile { rate, stop_buffer }
    }
}

impl VelocityProfile for DecelerationProfile {
    fn apply(&self, window: &mut [TrajectoryPoint]) {
        let Some(last) = window.last_mut() else {
            return;
        };
        last.target_speed = 0.0;
        let stop_position = last.position;

        for point in window.iter_mut() {
            let remaining = (distance(&point.position, &stop_position) - self.stop_buffer).max(0.0);
            point.target_speed = ramp_speed(self.rate, remaining).min(point.target_speed);
        }
    }

    fn name(&self) -> &str {
        "DecelerationProfile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RoutePoint;
    use approx::assert_relative_eq;

    fn window(speeds: &[f64]) -> Vec<TrajectoryPoint> {
        speeds
            .iter()
            .enumerate()
            .map(|(i, &s)| TrajectoryPoint::from(&RoutePoint::planar(10.0 * i as f64, 0.0, s)))
            .collect()
    }

    #[test]
    fn last_point_is_at_rest() {
        let mut points = window(&[10.0, 10.0, 10.0, 10.0]);
        DecelerationProfile::new(1.0, 2.5).apply(&mut points);
        assert_eq!(points.last().unwrap().target_speed, 0.0);
    }

    #[test]
    fn ramp_accounts_for_stop_buffer() {
        let mut points = window(&[10.0, 10.0, 10.0, 10.0]);
        DecelerationProfile::new(1.0, 2.5).apply(&mut points);
        // 10 m before the stop: sqrt(2 * 1 * 7.5)
        assert_relative_eq!(points[2].target_speed, 15.0_f64.sqrt());
        assert_relative_eq!(points[1].target_speed, 35.0_f64.sqrt());
        assert_relative_eq!(points[0].target_speed, 55.0_f64.sqrt());
    }

    #[test]
    fn points_inside_buffer_are_stopped() {
        let mut points = vec![
            TrajectoryPoint::from(&RoutePoint::planar(0.0, 0.0, 5.0)),
            TrajectoryPoint::from(&RoutePoint::planar(1.0, 0.0, 5.0)),
            TrajectoryPoint::from(&RoutePoint::planar(2.0, 0.0, 5.0)),
        ];
        DecelerationProfile::new(1.0, 2.5).apply(&mut points);
        assert!(points.iter().all(|p| p.target_speed == 0.0));
    }

    #[test]
    fn never_raises_a_speed() {
        let nominal = [1.0, 30.0, 0.5, 30.0, 4.0];
        let mut points = window(&nominal);
        DecelerationProfile::new(4.0, 2.5).apply(&mut points);
        for (point, &limit) in points.iter().zip(nominal.iter()) {
            assert!(point.target_speed <= limit);
        }
        assert_relative_eq!(points[0].target_speed, 1.0);
    }

    #[test]
    fn reapplying_is_idempotent() {
        let profile = DecelerationProfile::new(1.0, 2.5);
        let mut once = window(&[12.0, 3.0, 9.0, 10.0, 10.0, 6.0]);
        profile.apply(&mut once);
        let mut twice = once.clone();
        profile.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn single_point_window_stops_there() {
        let mut points = window(&[8.0]);
        DecelerationProfile::new(1.0, 2.5).apply(&mut points);
        assert_eq!(points[0].target_speed, 0.0);
    }

    #[test]
    fn empty_window_is_fine() {
        let mut points: Vec<TrajectoryPoint> = Vec::new();
        DecelerationProfile::new(1.0, 2.5).apply(&mut points);
        assert!(points.is_empty());
    }
}
