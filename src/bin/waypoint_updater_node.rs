use anyhow::{Error, Result};
use nalgebra::{Point3, Quaternion, UnitQuaternion};
use rclrs::{
    Context, CreateBasicExecutor, Node, RclrsErrorFilter, SpinOptions, QOS_PROFILE_DEFAULT,
};
use serde::Deserialize;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};
use waypoint_updater::config::UpdaterConfig;
use waypoint_updater::shared::SharedState;
use waypoint_updater::{RoutePoint, StopSignal, TrajectoryWindow, VehiclePose, WaypointUpdater};

// Import the message types directly from the crates
use geometry_msgs::msg::{Pose, PoseStamped, TwistStamped};
use nav_msgs::msg::Path;
use std_msgs::msg::{Float64MultiArray, Int32};

/// Node settings on top of the updater's own
#[derive(Debug, Clone, Deserialize)]
struct NodeConfig {
    /// Nominal speed given to every point of an incoming route (m/s)
    #[serde(default = "default_route_speed")]
    route_speed: f64,
    #[serde(flatten)]
    updater: UpdaterConfig,
}

fn default_route_speed() -> f64 {
    11.11
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            route_speed: default_route_speed(),
            updater: UpdaterConfig::default(),
        }
    }
}

struct WaypointUpdaterNode {
    node: Arc<Node>,
    _pose_subscription: Arc<rclrs::Subscription<PoseStamped>>,
    _velocity_subscription: Arc<rclrs::Subscription<TwistStamped>>,
    _route_subscription: Arc<rclrs::Subscription<Path>>,
    _traffic_subscription: Arc<rclrs::Subscription<Int32>>,
    _obstacle_subscription: Arc<rclrs::Subscription<Int32>>,
}

impl WaypointUpdaterNode {
    pub fn new(
        executor: &rclrs::Executor,
        name: &str,
        config: NodeConfig,
    ) -> Result<Arc<Self>, Error> {
        let node = executor.create_node(name)?;

        let updater = WaypointUpdater::new(config.updater)?;
        let state = updater.shared_state();

        let waypoints_publisher =
            node.create_publisher::<Path>("final_waypoints", QOS_PROFILE_DEFAULT)?;
        let speeds_publisher =
            node.create_publisher::<Float64MultiArray>("final_waypoint_speeds", QOS_PROFILE_DEFAULT)?;

        let pose_state = Arc::clone(&state);
        let pose_subscription = node.create_subscription::<PoseStamped, _>(
            "/current_pose",
            QOS_PROFILE_DEFAULT,
            move |msg: PoseStamped| {
                pose_state.update_pose(pose_from_msg(&msg.pose));
            },
        )?;

        let velocity_state = Arc::clone(&state);
        let velocity_subscription = node.create_subscription::<TwistStamped, _>(
            "/current_velocity",
            QOS_PROFILE_DEFAULT,
            move |msg: TwistStamped| {
                velocity_state.update_velocity(msg.twist.linear.x);
            },
        )?;

        let route_state = Arc::clone(&state);
        let route_speed = config.route_speed;
        let route_subscription = node.create_subscription::<Path, _>(
            "/base_waypoints",
            QOS_PROFILE_DEFAULT,
            move |msg: Path| {
                load_route(&route_state, &msg, route_speed);
            },
        )?;

        let traffic_state = Arc::clone(&state);
        let traffic_subscription = node.create_subscription::<Int32, _>(
            "/traffic_waypoint",
            QOS_PROFILE_DEFAULT,
            move |msg: Int32| {
                traffic_state.update_stop_signal(StopSignal::from_wire(msg.data));
            },
        )?;

        let obstacle_state = Arc::clone(&state);
        let obstacle_subscription = node.create_subscription::<Int32, _>(
            "/obstacle_waypoint",
            QOS_PROFILE_DEFAULT,
            move |msg: Int32| {
                obstacle_state.update_obstacle_signal(StopSignal::from_wire(msg.data));
            },
        )?;

        // Cycle loop on its own runtime so callbacks keep flowing while it runs
        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start cycle runtime: {}", e);
                    return;
                }
            };

            let sink = move |window: TrajectoryWindow| {
                let (path, speeds) = window_to_msgs(&window);
                if let Err(e) = waypoints_publisher.publish(&path) {
                    error!("Failed to publish final waypoints: {}", e);
                }
                if let Err(e) = speeds_publisher.publish(&speeds) {
                    error!("Failed to publish final waypoint speeds: {}", e);
                }
            };

            runtime.block_on(updater.run(sink, async {
                let _ = tokio::signal::ctrl_c().await;
            }));
        });

        Ok(Arc::new(WaypointUpdaterNode {
            node,
            _pose_subscription: pose_subscription,
            _velocity_subscription: velocity_subscription,
            _route_subscription: route_subscription,
            _traffic_subscription: traffic_subscription,
            _obstacle_subscription: obstacle_subscription,
        }))
    }
}

fn pose_from_msg(pose: &Pose) -> VehiclePose {
    let q = &pose.orientation;
    let orientation = UnitQuaternion::try_new(Quaternion::new(q.w, q.x, q.y, q.z), 1e-9)
        .unwrap_or_else(UnitQuaternion::identity);
    VehiclePose::new(
        Point3::new(pose.position.x, pose.position.y, pose.position.z),
        orientation,
    )
}

fn load_route(state: &SharedState, msg: &Path, route_speed: f64) {
    let points: Vec<RoutePoint> = msg
        .poses
        .iter()
        .map(|stamped| {
            let pose = pose_from_msg(&stamped.pose);
            RoutePoint::new(pose.position, pose.orientation, route_speed)
        })
        .collect();
    state.load_route(points);
}

fn window_to_msgs(window: &TrajectoryWindow) -> (Path, Float64MultiArray) {
    let mut path = Path::default();
    path.header.frame_id = window.frame_id.clone();
    path.poses = window
        .points
        .iter()
        .map(|point| {
            let mut pose_stamped = PoseStamped::default();
            pose_stamped.header.frame_id = window.frame_id.clone();
            pose_stamped.pose.position.x = point.position.x;
            pose_stamped.pose.position.y = point.position.y;
            pose_stamped.pose.position.z = point.position.z;
            let q = point.orientation.quaternion();
            pose_stamped.pose.orientation.x = q.i;
            pose_stamped.pose.orientation.y = q.j;
            pose_stamped.pose.orientation.z = q.k;
            pose_stamped.pose.orientation.w = q.w;
            pose_stamped
        })
        .collect();

    let mut speeds = Float64MultiArray::default();
    speeds.data = window.speeds();
    (path, speeds)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waypoint_updater=info".parse()?),
        )
        .init();

    info!("Initializing waypoint updater node...");

    // Optional TOML configuration as the first non-ROS argument
    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1).filter(|a| !a.starts_with("--")) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            let contents = std::fs::read_to_string(FsPath::new(path))?;
            let config: NodeConfig = toml::from_str(&contents)?;
            config.updater.validate()?;
            config
        }
        None => NodeConfig::default(),
    };

    let mut executor = Context::default_from_env()?.create_basic_executor();

    let waypoint_updater_node =
        WaypointUpdaterNode::new(&executor, "waypoint_updater", config)?;
    info!(
        "Waypoint updater node {} initialized. Starting to spin...",
        waypoint_updater_node.node.name()
    );

    executor
        .spin(SpinOptions::default())
        .first_error()
        .map_err(|err| err.into())
}
