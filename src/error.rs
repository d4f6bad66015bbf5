//! Error types for the waypoint updater

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid parameter `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Reasons a cycle produced no window
///
/// None of these are fatal; the loop logs them and moves on to the next cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("generator is not active")]
    Inactive,

    #[error("no route loaded yet")]
    RouteUnavailable,

    #[error("no vehicle pose received yet")]
    PoseUnavailable,

    #[error("vehicle pose has non-finite coordinates")]
    NonFinitePose,

    #[error("route has {len} points, at least 2 are required")]
    DegenerateRoute { len: usize },

    #[error("stop index {index} is outside the route (length {len})")]
    StopIndexOutOfRange { index: usize, len: usize },
}

impl CycleError {
    /// Whether the cycle was skipped only because the generator or its inputs are not ready yet
    pub fn is_waiting_for_input(&self) -> bool {
        matches!(
            self,
            CycleError::Inactive | CycleError::RouteUnavailable | CycleError::PoseUnavailable
        )
    }
}
