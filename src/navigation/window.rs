//! Window extraction from the route

use super::route::Route;
use crate::common::TrajectoryPoint;

/// Copy the route points from `start` to `end`, both inclusive
///
/// When `end < start` the window runs past the last route point and continues
/// from the first one. Indices are resolved modulo the route length and the
/// route itself is left untouched.
pub fn extract(route: &Route, start: usize, end: usize) -> Vec<TrajectoryPoint> {
    if route.is_empty() {
        return Vec::new();
    }

    let end = if end < start { end + route.len() } else { end };

    (start..=end)
        .filter_map(|i| route.at(i))
        .map(TrajectoryPoint::from)
        .collect()
}
