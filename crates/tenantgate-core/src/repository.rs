//! Collaborator traits.
//!
//! All operations are async. The tenant and auth crates are generic over
//! these traits and carry no dependency on the database crate.

use chrono::Duration;

use crate::error::GateResult;
use crate::models::session::Session;
use crate::models::tenant::{ConnectionDescriptor, CreateTenantRecord, TenantRecord};
use crate::models::user::{CreateUser, User};

// ---------------------------------------------------------------------------
// Master store
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTenantRecord,
    ) -> impl Future<Output = GateResult<TenantRecord>> + Send;
    fn get_by_identifier(
        &self,
        identifier: &str,
    ) -> impl Future<Output = GateResult<Option<TenantRecord>>> + Send;
    fn list(&self) -> impl Future<Output = GateResult<Vec<TenantRecord>>> + Send;
}

/// Persistence for session documents.
///
/// `save` is an upsert: saving an id that was swept as expired recreates
/// it rather than failing.
pub trait SessionStore: Send + Sync {
    fn create(&self) -> impl Future<Output = GateResult<Session>> + Send;
    fn get(&self, id: &str) -> impl Future<Output = GateResult<Option<Session>>> + Send;
    fn save(&self, session: &Session) -> impl Future<Output = GateResult<()>> + Send;
    fn delete(&self, id: &str) -> impl Future<Output = GateResult<()>> + Send;
    /// Delete sessions not touched within `max_age`. Returns how many were
    /// removed.
    fn cleanup_expired(&self, max_age: Duration) -> impl Future<Output = GateResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Users and credentials
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = GateResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = GateResult<Option<User>>> + Send;
}

/// Checks an email/password pair.
///
/// Returns the user id on success and `None` on bad credentials. Only
/// called after the throttle has admitted the attempt.
pub trait CredentialVerifier: Send + Sync {
    fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = GateResult<Option<String>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant stores
// ---------------------------------------------------------------------------

/// Opens live handles to tenant stores.
pub trait TenantConnector: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> impl Future<Output = GateResult<Self::Handle>> + Send;
}

/// Creates the isolated backing store for a new tenant.
pub trait StorageCreator: Send + Sync {
    fn create_store(
        &self,
        identifier: &str,
    ) -> impl Future<Output = GateResult<ConnectionDescriptor>> + Send;
}

/// Applies the tenant-scoped schema. Must be idempotent.
pub trait SchemaMigrator<H>: Send + Sync {
    fn migrate(&self, handle: &H) -> impl Future<Output = GateResult<()>> + Send;
}
