//! Shared application state.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tenantgate_auth::{AuthConfig, LoginInput, LoginService, PasswordVerifier};
use tenantgate_core::error::GateResult;
use tenantgate_core::repository::UserRepository;
use tenantgate_db::SurrealTenantStores;
use tenantgate_db::repository::{
    SurrealSessionStore, SurrealTenantRepository, SurrealUserRepository,
};
use tenantgate_tenant::{TenantDirectory, TenantProvisioner, TenantResolver};
use tracing::info;

use crate::config::BootstrapAdmin;
use crate::session::CookieSettings;

pub type TenantHandle = Surreal<Any>;
pub type Resolver = TenantResolver<SurrealTenantStores>;
pub type Provisioner =
    TenantProvisioner<SurrealTenantRepository<Any>, SurrealTenantStores, SurrealTenantStores>;
pub type Sessions = SurrealSessionStore<Any>;
pub type UserStore = SurrealUserRepository<Any>;
pub type Logins = LoginService<Sessions, PasswordVerifier<UserStore>>;

/// Services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<Provisioner>,
    pub logins: Arc<Logins>,
    pub master_users: UserStore,
    pub pepper: Option<String>,
    pub cookies: CookieSettings,
}

impl AppState {
    /// Wire the services over a migrated master store.
    pub fn new(
        master: Surreal<Any>,
        stores: SurrealTenantStores,
        auth: &AuthConfig,
        session_max_age: chrono::Duration,
        secure_cookies: bool,
    ) -> Self {
        let resolver = Arc::new(TenantResolver::new(
            Arc::new(TenantDirectory::new()),
            stores.clone(),
        ));
        let provisioner = TenantProvisioner::new(
            SurrealTenantRepository::new(master.clone()),
            stores,
            resolver,
        );

        let master_users = SurrealUserRepository::master(master.clone()).with_pepper(auth.pepper.clone());
        let logins = LoginService::new(
            SurrealSessionStore::new(master, session_max_age),
            PasswordVerifier::new(master_users.clone(), auth.pepper.clone()),
            auth,
        );

        Self {
            provisioner: Arc::new(provisioner),
            logins: Arc::new(logins),
            master_users,
            pepper: auth.pepper.clone(),
            cookies: CookieSettings {
                max_age_secs: session_max_age.num_seconds(),
                secure: secure_cookies,
            },
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        self.provisioner.resolver()
    }

    /// User repository of one tenant's store.
    pub fn tenant_users(&self, handle: TenantHandle) -> UserStore {
        SurrealUserRepository::tenant(handle).with_pepper(self.pepper.clone())
    }

    /// Create the first master-dashboard operator unless it exists.
    pub async fn seed_admin(&self, admin: &BootstrapAdmin) -> GateResult<()> {
        let email = admin.email.trim().to_lowercase();
        if self.master_users.get_by_email(&email).await?.is_some() {
            return Ok(());
        }
        let input = LoginInput {
            email,
            password: admin.password.clone(),
        };
        let user = self.logins.register(&self.master_users, &input).await?;
        info!(user_id = %user.id, "Bootstrap admin created");
        Ok(())
    }
}
