//! Common types shared across the waypoint updater

use nalgebra::{Point3, UnitQuaternion};

/// Euclidean distance between two positions (x, y and z)
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// One authored point on the route
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePoint {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// Speed the route was authored with; an upper bound for every target speed
    pub nominal_speed: f64,
}

impl RoutePoint {
    /// Create a route point
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>, nominal_speed: f64) -> Self {
        RoutePoint {
            position,
            orientation,
            nominal_speed,
        }
    }

    /// Route point on the ground plane with identity orientation
    pub fn planar(x: f64, y: f64, nominal_speed: f64) -> Self {
        RoutePoint::new(Point3::new(x, y, 0.0), UnitQuaternion::identity(), nominal_speed)
    }
}

/// Most recent pose of the vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl VehiclePose {
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        VehiclePose {
            position,
            orientation,
        }
    }

    /// Pose on the ground plane heading along `yaw`
    pub fn planar(x: f64, y: f64, yaw: f64) -> Self {
        VehiclePose::new(
            Point3::new(x, y, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        )
    }
}

/// Route index the vehicle has to stop at, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopSignal {
    #[default]
    None,
    At(usize),
}

impl StopSignal {
    /// Convert the integer form used on the wire, where any negative value means "none"
    pub fn from_wire(raw: i32) -> Self {
        if raw < 0 {
            StopSignal::None
        } else {
            StopSignal::At(raw as usize)
        }
    }

    /// Stop index, if a stop is requested
    pub fn index(&self) -> Option<usize> {
        match self {
            StopSignal::None => None,
            StopSignal::At(index) => Some(*index),
        }
    }
}

/// Velocity shaping mode of the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Accelerate toward and hold the route's nominal speed
    #[default]
    Cruise,
    /// Decelerate to a full stop at the stop index
    Braking,
}

/// One emitted motion target
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub target_speed: f64,
}

impl From<&RoutePoint> for TrajectoryPoint {
    fn from(point: &RoutePoint) -> Self {
        TrajectoryPoint {
            position: point.position,
            orientation: point.orientation,
            target_speed: point.nominal_speed,
        }
    }
}

/// The forward window published once per cycle
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryWindow {
    pub frame_id: String,
    /// Increases by one for every published window
    pub sequence: u64,
    /// Mode the speeds were shaped with
    pub mode: Mode,
    pub points: Vec<TrajectoryPoint>,
}

impl TrajectoryWindow {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Target speeds in emission order
    pub fn speeds(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.target_speed).collect()
    }
}
