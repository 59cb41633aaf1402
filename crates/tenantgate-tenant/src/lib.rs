//! tenantgate tenant: maps inbound requests to isolated tenant stores.
//!
//! - [`TenantDirectory`]: process-wide cache of persisted tenant records
//! - [`TenantResolver`]: identifier/host resolution and cached store handles
//! - [`TenantProvisioner`]: creates, persists, migrates and registers new
//!   tenants, and restores the directory at startup
//!
//! The crate is generic over the collaborator traits in
//! `tenantgate-core` and has no database dependency of its own.

mod directory;
mod host;
mod provisioning;
mod resolver;

pub use directory::TenantDirectory;
pub use host::subdomain_of;
pub use provisioning::TenantProvisioner;
pub use resolver::{ResolvedTenant, TenantResolver};
