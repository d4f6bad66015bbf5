//! Localization of the vehicle on the route

use crate::common::{distance, VehiclePose};
use crate::navigation::route::Route;

/// Finds where on the route the vehicle is
#[derive(Debug, Default, Clone, Copy)]
pub struct Localizer;

impl Localizer {
    /// Create a new localizer
    pub fn new() -> Self {
        Localizer
    }

    /// Index of the route point closest to the vehicle
    ///
    /// Linear scan; on equal distances the first point wins.
    pub fn closest_index(&self, pose: &VehiclePose, route: &Route) -> Option<usize> {
        let mut closest = None;
        let mut closest_dist = f64::INFINITY;
        for (i, point) in route.points().iter().enumerate() {
            let dist = distance(&pose.position, &point.position);
            if dist < closest_dist {
                closest_dist = dist;
                closest = Some(i);
            }
        }
        closest
    }

    /// Index of the first route point ahead of the vehicle
    ///
    /// If the vehicle is already level with or past the closest point (its offset
    /// from that point projects onto the direction of travel with a non-negative
    /// component) the following point is returned instead.
    pub fn next_index(&self, pose: &VehiclePose, route: &Route) -> Option<usize> {
        let closest = self.closest_index(pose, route)?;
        let following = (closest + 1) % route.len();

        let wp0 = route.at(closest)?.position;
        let wp1 = route.at(following)?.position;

        // Ground-plane projection; route altitude changes do not move the vehicle along it.
        let offset = (pose.position - wp0).xy();
        let direction = (wp1 - wp0).xy();

        if offset.dot(&direction) >= 0.0 {
            Some(following)
        } else {
            Some(closest)
        }
    }
}
