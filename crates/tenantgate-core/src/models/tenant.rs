//! Tenant domain model.
//!
//! A tenant is an isolated customer data partition with its own backing
//! store, addressed by a subdomain-style identifier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GateError, GateResult};

/// Persisted connection metadata for one tenant.
///
/// Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub tenant_id: Uuid,
    /// Lower-cased, unique across all tenants (e.g. `acme`).
    pub subdomain_identifier: String,
    /// Opaque connection string, see [`ConnectionDescriptor`].
    pub connection_descriptor: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to persist a new tenant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRecord {
    pub subdomain_identifier: String,
    pub connection_descriptor: String,
}

/// Normalize a raw tenant identifier.
///
/// Trims surrounding whitespace and lower-cases. Returns `None` when the
/// result is empty or contains anything other than ASCII letters, digits
/// and `-`, which keeps identifiers usable as database names and DNS
/// labels.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let id = raw.trim().to_ascii_lowercase();
    if id.is_empty() || id.starts_with('-') || id.ends_with('-') {
        return None;
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return None;
    }
    Some(id)
}

/// Parsed form of a tenant connection string.
///
/// Serialized as whitespace separated `key=value` pairs:
/// `endpoint=ws://127.0.0.1:8000 ns=tenants db=acme`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
}

impl ConnectionDescriptor {
    pub fn new(
        endpoint: impl Into<String>,
        namespace: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            namespace: namespace.into(),
            database: database.into(),
        }
    }

    /// Parse a persisted descriptor.
    ///
    /// Empty descriptors and descriptors missing any of the three keys
    /// fail with [`GateError::Connection`]; they must never be resolved.
    pub fn parse(raw: &str) -> GateResult<Self> {
        if raw.trim().is_empty() {
            return Err(GateError::Connection(
                "connection descriptor is empty".into(),
            ));
        }

        let mut endpoint = None;
        let mut namespace = None;
        let mut database = None;

        for pair in raw.split_whitespace() {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                GateError::Connection(format!("malformed descriptor segment: {pair}"))
            })?;
            if value.is_empty() {
                return Err(GateError::Connection(format!(
                    "descriptor key {key} has no value"
                )));
            }
            match key {
                "endpoint" => endpoint = Some(value.to_string()),
                "ns" => namespace = Some(value.to_string()),
                "db" => database = Some(value.to_string()),
                other => {
                    return Err(GateError::Connection(format!(
                        "unknown descriptor key: {other}"
                    )));
                }
            }
        }

        match (endpoint, namespace, database) {
            (Some(endpoint), Some(namespace), Some(database)) => Ok(Self {
                endpoint,
                namespace,
                database,
            }),
            _ => Err(GateError::Connection(format!(
                "descriptor is missing endpoint, ns or db: {raw}"
            ))),
        }
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "endpoint={} ns={} db={}",
            self.endpoint, self.namespace, self.database
        )
    }
}
