//! Route storage
//!
//! The route is loaded wholesale and never edited in place. Readers hold an
//! `Arc<Route>` so a reload never changes a route someone is iterating over.

use crate::common::RoutePoint;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Ordered, logically circular sequence of route points
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<RoutePoint>,
}

impl Route {
    pub fn new(points: Vec<RoutePoint>) -> Self {
        Route { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index` taken modulo the route length
    pub fn at(&self, index: usize) -> Option<&RoutePoint> {
        if self.points.is_empty() {
            return None;
        }
        self.points.get(index % self.points.len())
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }
}

/// Holder of the active route
#[derive(Debug, Default)]
pub struct RouteStore {
    active: RwLock<Option<Arc<Route>>>,
}

impl RouteStore {
    pub fn new() -> Self {
        RouteStore::default()
    }

    /// Replace the active route
    ///
    /// The new route is built completely before the swap, so readers see either
    /// the old route or the new one.
    pub fn load(&self, points: Vec<RoutePoint>) -> Arc<Route> {
        let route = Arc::new(Route::new(points));
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&route));
        info!("Loaded route with {} points", route.len());
        route
    }

    /// Currently active route, if one was loaded
    pub fn current(&self) -> Option<Arc<Route>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
