//! Lifecycle management for updater components

use crate::error::ConfigError;
use tracing::{debug, warn};

/// Trait for components that follow a lifecycle pattern
pub trait LifecycleNode: Send {
    /// Validate configuration and prepare internal state
    fn on_configure(&mut self) -> Result<(), ConfigError>;

    /// Start producing output
    fn on_activate(&mut self);

    /// Stop producing output and drop per-run state
    fn on_deactivate(&mut self);

    /// Return to the unconfigured state
    fn on_cleanup(&mut self);

    /// Final transition; the node accepts no further transitions
    fn on_shutdown(&mut self);

    /// Current lifecycle state
    fn state(&self) -> State;
}

/// State of a lifecycle node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
    Finalized,
}

impl State {
    fn can_transition_to(self, next: State) -> bool {
        use State::*;
        matches!(
            (self, next),
            (Unconfigured, Inactive)
                | (Inactive, Active)
                | (Active, Inactive)
                | (Inactive, Unconfigured)
                | (_, Finalized)
        ) && self != Finalized
    }
}

/// Base implementation for lifecycle nodes
#[derive(Debug)]
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

impl LifecycleNodeBase {
    /// Create a new lifecycle node base
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    /// Get the current state
    pub fn get_state(&self) -> State {
        self.state
    }

    /// Move to `state`; returns false and stays put if the transition is not allowed
    pub fn set_state(&mut self, state: State) -> bool {
        if !self.state.can_transition_to(state) {
            warn!(
                "{}: ignoring transition {:?} -> {:?}",
                self.name, self.state, state
            );
            return false;
        }
        debug!("{}: {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
        true
    }
}
