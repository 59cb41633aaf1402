//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantgate_core::error::GateResult;
use tenantgate_core::models::tenant::{CreateTenantRecord, TenantRecord};
use tenantgate_core::repository::TenantRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    subdomain_identifier: String,
    connection_descriptor: String,
    created_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_record(self, id: Uuid) -> TenantRecord {
        TenantRecord {
            tenant_id: id,
            subdomain_identifier: self.subdomain_identifier,
            connection_descriptor: self.connection_descriptor,
            created_at: self.created_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    subdomain_identifier: String,
    connection_descriptor: String,
    created_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_record(self) -> Result<TenantRecord, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(TenantRecord {
            tenant_id: id,
            subdomain_identifier: self.subdomain_identifier,
            connection_descriptor: self.connection_descriptor,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the tenant record repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenantRecord) -> GateResult<TenantRecord> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tenant_connection', $id) SET \
                 subdomain_identifier = $identifier, \
                 connection_descriptor = $descriptor",
            )
            .bind(("id", id_str.clone()))
            .bind(("identifier", input.subdomain_identifier))
            .bind(("descriptor", input.connection_descriptor))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant_connection".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id))
    }

    async fn get_by_identifier(&self, identifier: &str) -> GateResult<Option<TenantRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant_connection \
                 WHERE subdomain_identifier = $identifier",
            )
            .bind(("identifier", identifier.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(TenantRowWithId::try_into_record)
            .transpose()
            .map_err(Into::into)
    }

    async fn list(&self) -> GateResult<Vec<TenantRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant_connection \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        let records = rows
            .into_iter()
            .map(TenantRowWithId::try_into_record)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(records)
    }
}
