//! Acceleration ramp from a standstill

use super::{ramp_speed, VelocityProfile};
use crate::common::{distance, TrajectoryPoint};
use nalgebra::Point3;

/// Caps speeds at `sqrt(2 * rate * d)`, `d` being the distance from where the
/// vehicle last stood still
#[derive(Debug, Clone)]
pub struct AccelerationProfile {
    rate: f64,
    origin: Option<Point3<f64>>,
}

impl AccelerationProfile {
    pub fn new(rate: f64, origin: Option<Point3<f64>>) -> Self {
        AccelerationProfile { rate, origin }
    }
}

impl VelocityProfile for AccelerationProfile {
    fn apply(&self, window: &mut [TrajectoryPoint]) {
        // Never stopped yet: nothing to ramp from.
        let Some(origin) = self.origin else {
            return;
        };

        for point in window.iter_mut() {
            let limit = ramp_speed(self.rate, distance(&origin, &point.position));
            if point.target_speed > limit {
                point.target_speed = limit;
            } else {
                // The ramp has caught up with the route speed.
                break;
            }
        }
    }

    fn name(&self) -> &str {
        "AccelerationProfile"
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
            .map(|(i, &s)| TrajectoryPoint::from(&RoutePoint::planar(2.0 * (i + 1) as f64, 0.0, s)))
            .collect()
    }

    #[test]
    fn no_origin_leaves_window_untouched() {
        let mut points = window(&[10.0, 10.0]);
        AccelerationProfile::new(1.0, None).apply(&mut points);
        assert_eq!(points, window(&[10.0, 10.0]));
    }

    #[test]
    fn speeds_follow_square_root_ramp() {
        let mut points = window(&[10.0, 10.0, 10.0]);
        AccelerationProfile::new(1.0, Some(Point3::origin())).apply(&mut points);
        assert_relative_eq!(points[0].target_speed, 2.0);
        assert_relative_eq!(points[1].target_speed, 8.0_f64.sqrt());
        assert_relative_eq!(points[2].target_speed, 12.0_f64.sqrt());
    }

    #[test]
    fn stops_adjusting_once_ramp_catches_up() {
        // Point 1 (d = 4) is already below its ramp speed, point 2 would be capped but is not.
        let mut points = window(&[10.0, 1.0, 10.0]);
        AccelerationProfile::new(1.0, Some(Point3::origin())).apply(&mut points);
        assert_relative_eq!(points[0].target_speed, 2.0);
        assert_relative_eq!(points[1].target_speed, 1.0);
        assert_relative_eq!(points[2].target_speed, 10.0);
    }

    #[test]
    fn never_exceeds_nominal_speed() {
        let nominal = [0.5, 3.0, 0.2, 7.0, 1.0];
        let mut points = window(&nominal);
        AccelerationProfile::new(4.0, Some(Point3::new(1.0, 1.0, 0.0))).apply(&mut points);
        for (point, &limit) in points.iter().zip(nominal.iter()) {
            assert!(point.target_speed <= limit);
            assert!(point.target_speed >= 0.0);
        }
    }

    #[test]
    fn reapplying_is_idempotent() {
        let profile = AccelerationProfile::new(1.0, Some(Point3::origin()));
        let mut once = window(&[10.0, 10.0, 10.0]);
        profile.apply(&mut once);
        let mut twice = once.clone();
        profile.apply(&mut twice);
        assert_eq!(once, twice);
    }
}
