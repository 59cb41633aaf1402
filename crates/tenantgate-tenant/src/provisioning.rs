//! New-tenant provisioning and startup restore.

use std::sync::Arc;

use tenantgate_core::error::{GateError, GateResult};
use tenantgate_core::models::tenant::{CreateTenantRecord, TenantRecord, normalize_identifier};
use tenantgate_core::repository::{SchemaMigrator, StorageCreator, TenantConnector, TenantRepository};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::resolver::TenantResolver;

/// Creates tenants end to end.
///
/// Provisioning is serialized: two concurrent requests for the same
/// identifier yield exactly one record, the other gets
/// [`GateError::DuplicateTenant`].
pub struct TenantProvisioner<R, S, C: TenantConnector> {
    repo: R,
    stores: S,
    resolver: Arc<TenantResolver<C>>,
    lock: Mutex<()>,
}

impl<R, S, C> TenantProvisioner<R, S, C>
where
    R: TenantRepository,
    S: StorageCreator + SchemaMigrator<C::Handle>,
    C: TenantConnector,
{
    pub fn new(repo: R, stores: S, resolver: Arc<TenantResolver<C>>) -> Self {
        Self {
            repo,
            stores,
            resolver,
            lock: Mutex::new(()),
        }
    }

    pub fn resolver(&self) -> &Arc<TenantResolver<C>> {
        &self.resolver
    }

    /// Provision a tenant: create its store, persist the record, migrate
    /// the store, then register it in the directory.
    ///
    /// The tenant becomes resolvable only once every step has succeeded.
    /// A tenant that is persisted but not yet registered, because its
    /// migration failed earlier, is migrated and registered instead of
    /// being created again.
    /// A persistence failure after the store was created is reported as
    /// [`GateError::PartialProvisioning`] and names the orphaned store.
    pub async fn provision(&self, raw_identifier: &str) -> GateResult<TenantRecord> {
        let identifier =
            normalize_identifier(raw_identifier).ok_or_else(|| GateError::InvalidIdentifier {
                identifier: raw_identifier.to_string(),
            })?;

        let _guard = self.lock.lock().await;

        if self.resolver.directory().contains(&identifier) {
            return Err(GateError::DuplicateTenant { identifier });
        }
        let existing = self
            .repo
            .get_by_identifier(&identifier)
            .await
            .map_err(|e| GateError::PersistenceFailed {
                identifier: identifier.clone(),
                reason: e.to_string(),
            })?;
        if let Some(record) = existing {
            // Persisted by an earlier call whose migration failed.
            return self.complete(record).await;
        }

        let descriptor = self.stores.create_store(&identifier).await.map_err(|e| {
            GateError::StorageCreationFailed {
                identifier: identifier.clone(),
                reason: e.to_string(),
            }
        })?;

        let record = match self
            .repo
            .create(CreateTenantRecord {
                subdomain_identifier: identifier.clone(),
                connection_descriptor: descriptor.to_string(),
            })
            .await
        {
            Ok(record) => record,
            Err(e) => {
                error!(
                    tenant = %identifier,
                    descriptor = %descriptor,
                    error = %e,
                    "Tenant store created but record not persisted"
                );
                return Err(GateError::PartialProvisioning {
                    identifier,
                    descriptor: descriptor.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        // The record is persisted from here on; a failed migration is
        // retried by the next provision of the same identifier or by the
        // next startup restore.
        self.complete(record).await
    }

    /// Migrate a persisted tenant's store and register it.
    async fn complete(&self, record: TenantRecord) -> GateResult<TenantRecord> {
        let identifier = record.subdomain_identifier.clone();
        self.migrate(&record)
            .await
            .map_err(|e| GateError::MigrationFailed {
                identifier: identifier.clone(),
                reason: e.to_string(),
            })?;

        if !self.resolver.directory().insert(record.clone()) {
            return Err(GateError::DuplicateTenant { identifier });
        }

        info!(
            tenant = %record.subdomain_identifier,
            tenant_id = %record.tenant_id,
            "Tenant provisioned"
        );
        Ok(record)
    }

    /// Load every persisted tenant, migrate its store and register it.
    ///
    /// Tenants whose store cannot be reached or migrated are skipped and
    /// logged. Returns how many tenants were registered.
    pub async fn restore(&self) -> GateResult<usize> {
        let records = self.repo.list().await?;
        let total = records.len();
        let mut registered = 0;

        for record in records {
            if let Err(e) = self.migrate(&record).await {
                warn!(
                    tenant = %record.subdomain_identifier,
                    error = %e,
                    "Skipping tenant whose store could not be prepared"
                );
                continue;
            }
            if self.resolver.directory().insert(record) {
                registered += 1;
            }
        }

        info!(registered, total, "Tenant directory restored");
        Ok(registered)
    }

    async fn migrate(&self, record: &TenantRecord) -> GateResult<()> {
        let handle = self.resolver.connect(record).await?;
        self.stores.migrate(&handle).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::Utc;
    use parking_lot::Mutex as SyncMutex;
    use tenantgate_core::models::tenant::ConnectionDescriptor;
    use uuid::Uuid;

    use super::*;
    use crate::directory::TenantDirectory;

    #[derive(Clone, Default)]
    struct MemRepo {
        records: Arc<SyncMutex<Vec<TenantRecord>>>,
        fail_create: Arc<AtomicBool>,
    }

    impl TenantRepository for MemRepo {
        async fn create(&self, input: CreateTenantRecord) -> GateResult<TenantRecord> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(GateError::Database("write rejected".into()));
            }
            let record = TenantRecord {
                tenant_id: Uuid::new_v4(),
                subdomain_identifier: input.subdomain_identifier,
                connection_descriptor: input.connection_descriptor,
                created_at: Utc::now(),
            };
            self.records.lock().push(record.clone());
            Ok(record)
        }

        async fn get_by_identifier(&self, identifier: &str) -> GateResult<Option<TenantRecord>> {
            Ok(self
                .records
                .lock()
                .iter()
                .find(|r| r.subdomain_identifier == identifier)
                .cloned())
        }

        async fn list(&self) -> GateResult<Vec<TenantRecord>> {
            Ok(self.records.lock().clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakeStores {
        created: Arc<AtomicUsize>,
        migrated: Arc<AtomicUsize>,
        fail_create: Arc<AtomicBool>,
        fail_migrate: Arc<AtomicBool>,
    }

    impl StorageCreator for FakeStores {
        async fn create_store(&self, identifier: &str) -> GateResult<ConnectionDescriptor> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(GateError::Database("no space".into()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(ConnectionDescriptor::new("mem://", "tenants", identifier))
        }
    }

    impl SchemaMigrator<String> for FakeStores {
        async fn migrate(&self, _handle: &String) -> GateResult<()> {
            if self.fail_migrate.load(Ordering::SeqCst) {
                return Err(GateError::Database("bad schema".into()));
            }
            self.migrated.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct NameConnector;

    impl TenantConnector for NameConnector {
        type Handle = String;

        async fn connect(&self, descriptor: &ConnectionDescriptor) -> GateResult<String> {
            if descriptor.database == "unreachable" {
                return Err(GateError::Connection("refused".into()));
            }
            Ok(descriptor.database.clone())
        }
    }

    type Provisioner = TenantProvisioner<MemRepo, FakeStores, NameConnector>;

    fn setup() -> (Provisioner, MemRepo, FakeStores) {
        let repo = MemRepo::default();
        let stores = FakeStores::default();
        let resolver = Arc::new(TenantResolver::new(
            Arc::new(TenantDirectory::new()),
            NameConnector,
        ));
        let provisioner = TenantProvisioner::new(repo.clone(), stores.clone(), resolver);
        (provisioner, repo, stores)
    }

    #[tokio::test]
    async fn provisioned_tenant_is_resolvable() {
        let (p, repo, stores) = setup();

        let record = p.provision("Acme").await.unwrap();

        assert_eq!(record.subdomain_identifier, "acme");
        assert_eq!(
            record.connection_descriptor,
            "endpoint=mem:// ns=tenants db=acme"
        );
        assert_eq!(repo.records.lock().len(), 1);
        assert_eq!(stores.migrated.load(Ordering::SeqCst), 1);

        let resolved = p
            .resolver()
            .resolve_request(None, Some("acme.example.com"))
            .await
            .unwrap();
        assert_eq!(resolved.record.tenant_id, record.tenant_id);
        assert_eq!(resolved.handle, "acme");
    }

    #[tokio::test]
    async fn invalid_identifier_has_no_side_effects() {
        let (p, repo, stores) = setup();

        for bad in ["", "   ", "ac me", "acme.corp", "-acme"] {
            let err = p.provision(bad).await.unwrap_err();
            assert!(
                matches!(err, GateError::InvalidIdentifier { .. }),
                "{bad:?}: {err:?}"
            );
        }
        assert!(repo.records.lock().is_empty());
        assert_eq!(stores.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_is_rejected_before_any_store_is_created() {
        let (p, repo, stores) = setup();
        p.provision("acme").await.unwrap();

        let err = p.provision("ACME").await.unwrap_err();

        assert!(matches!(err, GateError::DuplicateTenant { .. }));
        assert_eq!(repo.records.lock().len(), 1);
        assert_eq!(stores.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persisted_but_unregistered_tenant_is_completed_not_recreated() {
        let (p, repo, stores) = setup();
        let persisted = repo
            .create(CreateTenantRecord {
                subdomain_identifier: "acme".into(),
                connection_descriptor: "endpoint=mem:// ns=tenants db=acme".into(),
            })
            .await
            .unwrap();

        let record = p.provision("acme").await.unwrap();

        assert_eq!(record.tenant_id, persisted.tenant_id);
        assert_eq!(repo.records.lock().len(), 1);
        assert_eq!(stores.created.load(Ordering::SeqCst), 0);
        assert!(p.resolver().resolve_by_identifier("acme").is_ok());
    }

    #[tokio::test]
    async fn concurrent_provisions_yield_one_record() {
        let (p, repo, _stores) = setup();
        let p = Arc::new(p);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let p = p.clone();
            tasks.push(tokio::spawn(async move { p.provision("acme").await }));
        }

        let mut ok = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => ok += 1,
                Err(GateError::DuplicateTenant { .. }) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(repo.records.lock().len(), 1);
        assert_eq!(p.resolver().directory().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_stops_provisioning() {
        let (p, repo, stores) = setup();
        stores.fail_create.store(true, Ordering::SeqCst);

        let err = p.provision("acme").await.unwrap_err();

        assert!(matches!(err, GateError::StorageCreationFailed { .. }));
        assert!(repo.records.lock().is_empty());
        assert!(p.resolver().directory().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_after_store_creation_is_partial() {
        let (p, repo, stores) = setup();
        repo.fail_create.store(true, Ordering::SeqCst);

        let err = p.provision("acme").await.unwrap_err();

        match err {
            GateError::PartialProvisioning {
                identifier,
                descriptor,
                ..
            } => {
                assert_eq!(identifier, "acme");
                assert_eq!(descriptor, "endpoint=mem:// ns=tenants db=acme");
            }
            other => panic!("expected partial provisioning, got {other:?}"),
        }
        assert_eq!(stores.created.load(Ordering::SeqCst), 1);
        assert!(p.resolver().directory().is_empty());
    }

    #[tokio::test]
    async fn migration_failure_leaves_tenant_unresolvable() {
        let (p, repo, stores) = setup();
        stores.fail_migrate.store(true, Ordering::SeqCst);

        let err = p.provision("acme").await.unwrap_err();

        assert!(matches!(err, GateError::MigrationFailed { .. }));
        assert_eq!(repo.records.lock().len(), 1);
        assert!(matches!(
            p.resolver().resolve_by_identifier("acme"),
            Err(GateError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn provision_retries_a_failed_migration() {
        let (p, repo, stores) = setup();
        stores.fail_migrate.store(true, Ordering::SeqCst);
        let err = p.provision("acme").await.unwrap_err();
        assert!(matches!(err, GateError::MigrationFailed { .. }));

        stores.fail_migrate.store(false, Ordering::SeqCst);
        let record = p.provision("acme").await.unwrap();

        assert_eq!(repo.records.lock().len(), 1);
        assert_eq!(stores.created.load(Ordering::SeqCst), 1);
        let resolved = p.resolver().resolve_by_identifier("acme").unwrap();
        assert_eq!(resolved.tenant_id, record.tenant_id);

        let again = p.provision("acme").await.unwrap_err();
        assert!(matches!(again, GateError::DuplicateTenant { .. }));
    }

    #[tokio::test]
    async fn restore_registers_reachable_tenants() {
        let (p, repo, stores) = setup();
        for db in ["acme", "unreachable", "globex"] {
            repo.create(CreateTenantRecord {
                subdomain_identifier: db.into(),
                connection_descriptor: format!("endpoint=mem:// ns=tenants db={db}"),
            })
            .await
            .unwrap();
        }

        let registered = p.restore().await.unwrap();

        assert_eq!(registered, 2);
        assert_eq!(stores.migrated.load(Ordering::SeqCst), 2);
        let dir = p.resolver().directory();
        assert!(dir.contains("acme"));
        assert!(dir.contains("globex"));
        assert!(!dir.contains("unreachable"));
    }

    #[tokio::test]
    async fn restore_retries_a_previously_failed_migration() {
        let (p, _repo, stores) = setup();
        stores.fail_migrate.store(true, Ordering::SeqCst);
        p.provision("acme").await.unwrap_err();

        stores.fail_migrate.store(false, Ordering::SeqCst);
        assert_eq!(p.restore().await.unwrap(), 1);
        assert!(p.resolver().resolve_by_identifier("acme").is_ok());
    }
}
