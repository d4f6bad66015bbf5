//! Route handling: storage of the active route and window extraction
pub mod route;
pub mod window;

pub use self::route::{Route, RouteStore};
pub use self::window::extract;
