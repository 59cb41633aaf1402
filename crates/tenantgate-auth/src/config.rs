//! Authentication configuration.

use chrono::Duration;

use crate::throttle::ThrottlePolicy;

/// Configuration for the login service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum password length accepted at login (default: 8).
    pub min_password_length: usize,
    /// Attempts admitted per identity before lockout (default: 3).
    pub max_failed_login_attempts: u32,
    /// Lockout window in seconds, measured from the last counted attempt
    /// (default: 1800 = 30 min).
    pub lockout_duration_secs: u64,
}

impl AuthConfig {
    pub fn throttle_policy(&self) -> ThrottlePolicy {
        ThrottlePolicy {
            max_attempts: self.max_failed_login_attempts,
            window: seconds(self.lockout_duration_secs),
        }
    }
}

/// Convert a configured number of seconds, saturating at the largest
/// representable duration.
pub fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
            max_failed_login_attempts: 3,
            lockout_duration_secs: 1800,
        }
    }
}
