//! Tenant connection resolution.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tenantgate_core::error::{GateError, GateResult};
use tenantgate_core::models::tenant::{ConnectionDescriptor, TenantRecord};
use tenantgate_core::repository::TenantConnector;
use tracing::debug;

use crate::directory::TenantDirectory;
use crate::host::subdomain_of;

/// A tenant resolved for one request, with a live handle to its store.
#[derive(Debug, Clone)]
pub struct ResolvedTenant<H> {
    pub record: TenantRecord,
    pub handle: H,
}

/// Resolves identifiers and hosts to tenant records and store handles.
///
/// Handles are opened lazily and cached per identifier. Resolution never
/// mutates the directory.
pub struct TenantResolver<C: TenantConnector> {
    directory: Arc<TenantDirectory>,
    connector: C,
    handles: RwLock<HashMap<String, C::Handle>>,
}

impl<C: TenantConnector> TenantResolver<C> {
    pub fn new(directory: Arc<TenantDirectory>, connector: C) -> Self {
        Self {
            directory,
            connector,
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Arc<TenantDirectory> {
        &self.directory
    }

    /// Exact-match lookup against the directory.
    pub fn resolve_by_identifier(&self, identifier: &str) -> GateResult<TenantRecord> {
        let key = identifier.trim().to_ascii_lowercase();
        self.directory
            .get(&key)
            .ok_or(GateError::NotFound { identifier: key })
    }

    /// Resolve the tenant named by the first label of `host`.
    pub fn resolve_by_host(&self, host: &str) -> GateResult<TenantRecord> {
        let label = subdomain_of(host)?;
        self.resolve_by_identifier(label)
    }

    /// Live handle to a tenant's store, opened on first use.
    ///
    /// Fails with [`GateError::Connection`] when the descriptor is empty
    /// or malformed, or the store cannot be reached. No retries.
    pub async fn connect(&self, record: &TenantRecord) -> GateResult<C::Handle> {
        let cached = self
            .handles
            .read()
            .get(&record.subdomain_identifier)
            .cloned();
        if let Some(handle) = cached {
            return Ok(handle);
        }

        let descriptor = ConnectionDescriptor::parse(&record.connection_descriptor)?;
        let handle = self
            .connector
            .connect(&descriptor)
            .await
            .map_err(|e| match e {
                GateError::Connection(_) => e,
                other => GateError::Connection(other.to_string()),
            })?;

        debug!(tenant = %record.subdomain_identifier, "Tenant store handle opened");

        // Another request may have connected meanwhile; keep the first.
        let mut handles = self.handles.write();
        Ok(handles
            .entry(record.subdomain_identifier.clone())
            .or_insert(handle)
            .clone())
    }

    /// Resolve an inbound request.
    ///
    /// A non-empty explicit identifier takes precedence over the host.
    /// There is no default tenant: if neither resolves, the request fails.
    pub async fn resolve_request(
        &self,
        explicit: Option<&str>,
        host: Option<&str>,
    ) -> GateResult<ResolvedTenant<C::Handle>> {
        let record = match explicit.map(str::trim).filter(|id| !id.is_empty()) {
            Some(identifier) => self.resolve_by_identifier(identifier)?,
            None => {
                let host = host.ok_or_else(|| GateError::Malformed {
                    host: String::new(),
                })?;
                self.resolve_by_host(host)?
            }
        };

        let handle = self.connect(&record).await?;
        Ok(ResolvedTenant { record, handle })
    }
}
