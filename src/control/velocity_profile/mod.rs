//! Velocity profiles applied to an extracted window

use crate::common::TrajectoryPoint;
use std::fmt::Debug;

/// Rewrites the target speeds of a window in place
///
/// Profiles only ever lower speeds, so every result stays within the
/// route's nominal speeds.
pub trait VelocityProfile: Debug + Send + Sync {
    /// Shape the speeds of `window`
    fn apply(&self, window: &mut [TrajectoryPoint]);

    /// Get the name of this profile
    fn name(&self) -> &str;
}

/// Speed reachable from rest over `distance` at a constant `rate`
pub(crate) fn ramp_speed(rate: f64, distance: f64) -> f64 {
    (2.0 * rate * distance).sqrt()
}

pub mod accelerate;
pub mod decelerate;

pub use accelerate::AccelerationProfile;
pub use decelerate::DecelerationProfile;
