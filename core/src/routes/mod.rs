//! The app's endpoint catalog.
//!
//! Each submodule declares one closed route enum and the typed functions
//! that fetch it.

pub mod general;
pub mod users;

pub use general::GeneralRoute;
pub use users::UserRoute;
