//! Vehicle localization on the route
pub mod localization;

pub use self::localization::Localizer;
