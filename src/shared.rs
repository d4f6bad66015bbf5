//! Shared input state
//!
//! Each input has its own slot, written by whichever task receives that input
//! and read once at the start of every cycle. Slots are replaced whole, so a
//! reader never sees half an update. Different slots may be a few updates
//! apart from each other.

use crate::common::{RoutePoint, StopSignal, VehiclePose};
use crate::navigation::route::{Route, RouteStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Atomic wrapper for f64 values.
/// Uses AtomicU64 with bit reinterpretation.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(val: f64) -> Self {
        Self(AtomicU64::new(val.to_bits()))
    }

    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    pub fn store(&self, val: f64, order: Ordering) {
        self.0.store(val.to_bits(), order);
    }
}

/// Inputs as seen by one cycle
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub route: Option<Arc<Route>>,
    pub pose: Option<VehiclePose>,
    /// Forward speed (m/s); 0 until the first update
    pub velocity: f64,
    pub stop: StopSignal,
    /// Received but not used for shaping
    pub obstacle: StopSignal,
}

/// Latest value of every input
#[derive(Debug)]
pub struct SharedState {
    route: RouteStore,
    pose: RwLock<Option<VehiclePose>>,
    velocity: AtomicF64,
    stop: RwLock<StopSignal>,
    obstacle: RwLock<StopSignal>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            route: RouteStore::new(),
            pose: RwLock::new(None),
            velocity: AtomicF64::new(0.0),
            stop: RwLock::new(StopSignal::None),
            obstacle: RwLock::new(StopSignal::None),
        }
    }

    pub fn update_pose(&self, pose: VehiclePose) {
        *self.pose.write().unwrap_or_else(PoisonError::into_inner) = Some(pose);
    }

    pub fn update_velocity(&self, velocity: f64) {
        self.velocity.store(velocity, Ordering::Release);
    }

    pub fn load_route(&self, points: Vec<RoutePoint>) -> Arc<Route> {
        self.route.load(points)
    }

    pub fn update_stop_signal(&self, stop: StopSignal) {
        *self.stop.write().unwrap_or_else(PoisonError::into_inner) = stop;
    }

    pub fn update_obstacle_signal(&self, obstacle: StopSignal) {
        *self.obstacle.write().unwrap_or_else(PoisonError::into_inner) = obstacle;
    }

    /// Read every slot once
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            route: self.route.current(),
            pose: *self.pose.read().unwrap_or_else(PoisonError::into_inner),
            velocity: self.velocity.load(Ordering::Acquire),
            stop: *self.stop.read().unwrap_or_else(PoisonError::into_inner),
            obstacle: *self.obstacle.read().unwrap_or_else(PoisonError::into_inner),
        }
    }
}
