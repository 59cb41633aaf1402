//! Domain models for tenantgate.

pub mod session;
pub mod tenant;
pub mod throttle;
pub mod user;
