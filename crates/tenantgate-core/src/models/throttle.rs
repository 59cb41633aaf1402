//! Login throttle state carried inside a session.
//!
//! Two profiles exist and never share keyspace: the host (master
//! dashboard) profile keyed by email, and the client (tenant dashboard)
//! profile keyed by tenant identifier and then email.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attempt counter for one login identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_count: u32,
    pub last_attempt_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn first(now: DateTime<Utc>) -> Self {
        Self {
            attempt_count: 1,
            last_attempt_at: now,
        }
    }
}

/// Throttle and authorization state for the master dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    /// Keyed by the email used to attempt login.
    pub login_attempts: BTreeMap<String, AttemptRecord>,
    pub authorized: bool,
    pub authorized_at: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
}

/// Authorization of a session against one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantAuthorization {
    pub authorized: bool,
    pub authorized_at: DateTime<Utc>,
    pub user_id: String,
}

/// Throttle and authorization state for tenant dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Tenant identifier -> email -> attempts.
    pub login_attempts: BTreeMap<String, BTreeMap<String, AttemptRecord>>,
    /// Keyed by tenant identifier.
    pub authorizations: BTreeMap<String, TenantAuthorization>,
}

impl ClientProfile {
    pub fn is_authorized(&self, tenant: &str) -> bool {
        self.authorizations
            .get(tenant)
            .is_some_and(|a| a.authorized)
    }

    pub fn attempts(&self, tenant: &str, email: &str) -> Option<&AttemptRecord> {
        self.login_attempts.get(tenant)?.get(email)
    }
}
