//! Per-tenant store creation, connection and migration.
//!
//! Every tenant gets its own SurrealDB database inside a shared tenants
//! namespace. Handles are independent clients, so selecting one tenant's
//! database never changes what the master connection sees.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tenantgate_core::error::{GateError, GateResult};
use tenantgate_core::models::tenant::ConnectionDescriptor;
use tenantgate_core::repository::{SchemaMigrator, StorageCreator, TenantConnector};
use tracing::{debug, info};

use crate::schema::run_tenant_migrations;

/// Where tenant stores live.
#[derive(Debug, Clone)]
pub struct TenantStoreConfig {
    /// Endpoint every tenant store is created on (e.g. `ws://127.0.0.1:8000`).
    pub endpoint: String,
    /// Namespace holding one database per tenant.
    pub namespace: String,
    /// Root credentials. Never persisted in connection descriptors.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for TenantStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:8000".into(),
            namespace: "tenants".into(),
            username: Some("root".into()),
            password: Some("root".into()),
        }
    }
}

/// SurrealDB implementation of the tenant store collaborators.
#[derive(Debug, Clone)]
pub struct SurrealTenantStores {
    config: TenantStoreConfig,
}

impl SurrealTenantStores {
    pub fn new(config: TenantStoreConfig) -> Self {
        Self { config }
    }

    /// Descriptor of the store a tenant with this identifier lives in.
    pub fn descriptor_for(&self, identifier: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::new(
            self.config.endpoint.clone(),
            self.config.namespace.clone(),
            identifier.to_ascii_lowercase(),
        )
    }

    async fn open(&self, endpoint: &str) -> Result<Surreal<Any>, surrealdb::Error> {
        let db = any::connect(endpoint).await?;
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        {
            db.signin(Root {
                username: username.clone(),
                password: password.clone(),
            })
            .await?;
        }
        Ok(db)
    }
}

impl StorageCreator for SurrealTenantStores {
    async fn create_store(&self, identifier: &str) -> GateResult<ConnectionDescriptor> {
        let descriptor = self.descriptor_for(identifier);

        let db = self
            .open(&descriptor.endpoint)
            .await
            .map_err(|e| GateError::Connection(e.to_string()))?;

        // Identifiers are restricted to [a-z0-9-]; backticks cover the dash.
        let ddl = format!(
            "DEFINE NAMESPACE IF NOT EXISTS `{ns}`; \
             USE NS `{ns}`; \
             DEFINE DATABASE IF NOT EXISTS `{db}`;",
            ns = descriptor.namespace,
            db = descriptor.database,
        );
        db.query(ddl)
            .await
            .map_err(|e| GateError::Database(e.to_string()))?
            .check()
            .map_err(|e| GateError::Database(e.to_string()))?;

        info!(tenant = %identifier, descriptor = %descriptor, "Tenant store created");

        Ok(descriptor)
    }
}

impl TenantConnector for SurrealTenantStores {
    type Handle = Surreal<Any>;

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> GateResult<Surreal<Any>> {
        let db = self
            .open(&descriptor.endpoint)
            .await
            .map_err(|e| GateError::Connection(e.to_string()))?;

        db.use_ns(&descriptor.namespace)
            .use_db(&descriptor.database)
            .await
            .map_err(|e| GateError::Connection(e.to_string()))?;

        debug!(descriptor = %descriptor, "Connected to tenant store");

        Ok(db)
    }
}

impl SchemaMigrator<Surreal<Any>> for SurrealTenantStores {
    async fn migrate(&self, handle: &Surreal<Any>) -> GateResult<()> {
        run_tenant_migrations(handle).await.map_err(Into::into)
    }
}
