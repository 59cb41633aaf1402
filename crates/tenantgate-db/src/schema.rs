//! Schema definitions and migration runner for SurrealDB.
//!
//! Two independent migration sets exist: the master schema (tenant
//! records, dashboard operators, sessions) and the tenant schema applied
//! to every tenant store. Each store tracks its own applied versions in a
//! `_migration` table, so both sets are safe to re-run.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MASTER_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "master_schema",
    sql: MASTER_SCHEMA_V1,
}];

static TENANT_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "tenant_schema",
    sql: TENANT_SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Master schema v1
// -----------------------------------------------------------------------

const MASTER_SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenant connection records
-- =======================================================================
DEFINE TABLE tenant_connection SCHEMAFULL;
DEFINE FIELD subdomain_identifier ON TABLE tenant_connection TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD connection_descriptor ON TABLE tenant_connection TYPE string \
    ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD created_at ON TABLE tenant_connection TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_connection_identifier ON TABLE tenant_connection \
    COLUMNS subdomain_identifier UNIQUE;

-- =======================================================================
-- Master dashboard operators
-- =======================================================================
DEFINE TABLE master_user SCHEMAFULL;
DEFINE FIELD email ON TABLE master_user TYPE string;
DEFINE FIELD password_hash ON TABLE master_user TYPE string;
DEFINE FIELD created_at ON TABLE master_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_master_user_email ON TABLE master_user \
    COLUMNS email UNIQUE;

-- =======================================================================
-- HTTP sessions (record id is the SHA-256 of the session token)
-- =======================================================================
DEFINE TABLE http_session SCHEMAFULL;
DEFINE FIELD payload ON TABLE http_session TYPE string;
DEFINE FIELD created_at ON TABLE http_session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE http_session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_http_session_updated_at ON TABLE http_session \
    COLUMNS updated_at;
";

// -----------------------------------------------------------------------
// Tenant schema v1
// -----------------------------------------------------------------------

const TENANT_SCHEMA_V1: &str = "\
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
";

/// Apply all pending master migrations.
pub async fn run_master_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    apply(db, MASTER_MIGRATIONS).await
}

/// Apply all pending tenant migrations to a tenant store.
pub async fn run_tenant_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    apply(db, TENANT_MIGRATIONS).await
}

/// Run every migration in `migrations` whose version exceeds the
/// store's current maximum.
async fn apply<C: Connection>(db: &Surreal<C>, migrations: &[Migration]) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in migrations {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "Migration applied successfully");
        }
    }

    Ok(())
}
