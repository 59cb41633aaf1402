//! tenantgate auth: login throttling, session-scoped authorization and
//! password verification for the host and tenant dashboards.

pub mod config;
pub mod error;
pub mod locks;
pub mod password;
pub mod service;
pub mod throttle;
pub mod validation;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::PasswordVerifier;
pub use service::{LoginInput, LoginOutcome, LoginService};
pub use throttle::{ThrottleDecision, ThrottlePolicy};
