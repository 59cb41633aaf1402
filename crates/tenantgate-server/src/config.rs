//! Server configuration loaded from environment variables.
//!
//! Every variable has a default suitable for local development. Values
//! that are present but unparsable fail startup.

use std::env;
use std::str::FromStr;

use tenantgate_auth::AuthConfig;
use tenantgate_auth::config::seconds;
use tenantgate_db::{DbConfig, TenantStoreConfig};
use thiserror::Error;

/// Upper bound for durations read from the environment (100 years).
pub const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Seed credentials for the first master-dashboard operator.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    pub tenant_stores: TenantStoreConfig,
    pub auth: AuthConfig,
    /// Sessions idle for longer than this are expired (default: 24 h).
    pub session_max_age_secs: u64,
    /// Interval between expiry sweeps (default: 1 h).
    pub session_sweep_interval_secs: u64,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db: DbConfig::default(),
            tenant_stores: TenantStoreConfig::default(),
            auth: AuthConfig::default(),
            session_max_age_secs: 86_400,
            session_sweep_interval_secs: 3_600,
            secure_cookies: false,
            bootstrap_admin: None,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db = DbConfig {
            url: var("TENANTGATE_DB_URL").unwrap_or(defaults.db.url),
            namespace: var("TENANTGATE_DB_NAMESPACE").unwrap_or(defaults.db.namespace),
            database: var("TENANTGATE_DB_DATABASE").unwrap_or(defaults.db.database),
            username: var("TENANTGATE_DB_USER").or(defaults.db.username),
            password: var("TENANTGATE_DB_PASS").or(defaults.db.password),
        };

        let tenant_stores = TenantStoreConfig {
            endpoint: var("TENANTGATE_TENANT_DB_URL").unwrap_or_else(|| db.url.clone()),
            namespace: var("TENANTGATE_TENANT_NAMESPACE")
                .unwrap_or(defaults.tenant_stores.namespace),
            username: db.username.clone(),
            password: db.password.clone(),
        };

        let auth = AuthConfig {
            pepper: var("TENANTGATE_PASSWORD_PEPPER"),
            min_password_length: parse(&var, "TENANTGATE_MIN_PASSWORD_LENGTH")?
                .unwrap_or(defaults.auth.min_password_length),
            max_failed_login_attempts: parse(&var, "TENANTGATE_LOGIN_MAX_ATTEMPTS")?
                .unwrap_or(defaults.auth.max_failed_login_attempts),
            lockout_duration_secs: parse_secs(
                &var,
                "TENANTGATE_LOGIN_LOCKOUT_SECS",
                defaults.auth.lockout_duration_secs,
            )?,
        };
        if auth.max_failed_login_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                var: "TENANTGATE_LOGIN_MAX_ATTEMPTS".into(),
                message: "must be at least 1".into(),
            });
        }

        let bootstrap_admin = match (
            var("TENANTGATE_BOOTSTRAP_EMAIL"),
            var("TENANTGATE_BOOTSTRAP_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue {
                    var: "TENANTGATE_BOOTSTRAP_EMAIL".into(),
                    message: "email and password must be set together".into(),
                });
            }
        };

        Ok(Self {
            host: var("TENANTGATE_HOST").unwrap_or(defaults.host),
            port: parse(&var, "TENANTGATE_PORT")?.unwrap_or(defaults.port),
            db,
            tenant_stores,
            auth,
            session_max_age_secs: parse_secs(
                &var,
                "TENANTGATE_SESSION_MAX_AGE_SECS",
                defaults.session_max_age_secs,
            )?,
            session_sweep_interval_secs: parse_secs(
                &var,
                "TENANTGATE_SESSION_SWEEP_SECS",
                defaults.session_sweep_interval_secs,
            )?,
            secure_cookies: parse(&var, "TENANTGATE_SECURE_COOKIES")?
                .unwrap_or(defaults.secure_cookies),
            bootstrap_admin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_max_age(&self) -> chrono::Duration {
        seconds(self.session_max_age_secs)
    }
}

/// Parse a duration in whole seconds, bounded to `1..=MAX_DURATION_SECS`.
fn parse_secs(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let secs = parse(var, key)?.unwrap_or(default);
    if !(1..=MAX_DURATION_SECS).contains(&secs) {
        return Err(ConfigError::InvalidValue {
            var: key.to_string(),
            message: format!("must be between 1 and {MAX_DURATION_SECS} seconds"),
        });
    }
    Ok(secs)
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                var: key.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}
