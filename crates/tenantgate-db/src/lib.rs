//! tenantgate database: SurrealDB connection management, schema
//! migrations and implementations of the `tenantgate-core` collaborator
//! traits.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Master and tenant schema migrations ([`run_master_migrations`],
//!   [`run_tenant_migrations`])
//! - Repositories for tenant records, users and sessions
//! - Per-tenant store creation and connection ([`SurrealTenantStores`])
//! - The background session expiry sweep ([`spawn_session_sweep`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod stores;
mod sweep;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::session::{generate_session_token, hash_session_token};
pub use schema::{run_master_migrations, run_tenant_migrations};
pub use stores::{SurrealTenantStores, TenantStoreConfig};
pub use sweep::spawn_session_sweep;
