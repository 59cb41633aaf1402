//! Login service: throttled login, logout and authorization guards for
//! the host (master) and tenant dashboards.

use chrono::Utc;
use tenantgate_core::error::{GateError, GateResult};
use tenantgate_core::models::session::Session;
use tenantgate_core::models::user::{CreateUser, User};
use tenantgate_core::repository::{CredentialVerifier, SessionStore, UserRepository};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::locks::{SessionGuard, SessionLocks};
use crate::throttle::{self, ThrottleDecision, ThrottlePolicy};
use crate::validation;

/// Credentials submitted to a login endpoint.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Result of a login attempt that passed validation.
///
/// The session id is always set, also for denied attempts, so the
/// caller can hand it back and later attempts count against the same
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session_id: String,
    pub decision: ThrottleDecision,
    /// Set when the session is authorized after this attempt.
    pub user_id: Option<String>,
}

impl LoginOutcome {
    /// Collapse into an error for denied or failed attempts.
    pub fn check(&self) -> GateResult<()> {
        match self.decision {
            ThrottleDecision::LockedOut { remaining } => Err(AuthError::LockedOut {
                remaining_secs: remaining.num_seconds(),
            }
            .into()),
            ThrottleDecision::Proceed { .. } if self.user_id.is_none() => {
                Err(AuthError::InvalidCredentials.into())
            }
            _ => Ok(()),
        }
    }
}

/// Login orchestration over a session store.
///
/// Each attempt runs load, evaluate, save, verify and save under the
/// session's lock, so parallel attempts on one session never lose a
/// counted strike. The host verifier is fixed; tenant logins are given
/// the verifier for the resolved tenant.
pub struct LoginService<S: SessionStore, V: CredentialVerifier> {
    sessions: S,
    host_verifier: V,
    policy: ThrottlePolicy,
    min_password_length: usize,
    locks: SessionLocks,
}

impl<S: SessionStore, V: CredentialVerifier> LoginService<S, V> {
    pub fn new(sessions: S, host_verifier: V, config: &AuthConfig) -> Self {
        Self {
            sessions,
            host_verifier,
            policy: config.throttle_policy(),
            min_password_length: config.min_password_length,
            locks: SessionLocks::new(),
        }
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Attempt a master-dashboard login.
    pub async fn host_login(
        &self,
        session_id: Option<&str>,
        input: &LoginInput,
    ) -> GateResult<LoginOutcome> {
        let email = self.validate(input)?;
        let (mut session, _guard) = self.checkout(session_id).await?;
        let now = Utc::now();

        let decision = self
            .policy
            .evaluate_host(&mut session.data.host, &email, now);
        let mut outcome = LoginOutcome {
            session_id: session.id.clone(),
            decision,
            user_id: None,
        };

        match decision {
            ThrottleDecision::AlreadyAuthorized => {
                outcome.user_id = session.data.host.user_id.clone();
                return Ok(outcome);
            }
            ThrottleDecision::LockedOut { remaining } => {
                warn!(
                    email = %email,
                    remaining_secs = remaining.num_seconds(),
                    "Host login locked out"
                );
                return Ok(outcome);
            }
            ThrottleDecision::Proceed { .. } => {}
        }

        self.persist(&mut session).await?;

        match self.host_verifier.verify(&email, &input.password).await? {
            Some(user_id) => {
                throttle::record_host_success(&mut session.data.host, &email, &user_id, now);
                self.persist(&mut session).await?;
                info!(email = %email, user_id = %user_id, "Host login succeeded");
                outcome.user_id = Some(user_id);
            }
            None => warn!(email = %email, ?decision, "Host login failed"),
        }

        Ok(outcome)
    }

    /// Attempt a login to `tenant`'s dashboard, verifying against that
    /// tenant's users.
    pub async fn tenant_login<T: CredentialVerifier>(
        &self,
        session_id: Option<&str>,
        tenant: &str,
        input: &LoginInput,
        verifier: &T,
    ) -> GateResult<LoginOutcome> {
        let email = self.validate(input)?;
        let (mut session, _guard) = self.checkout(session_id).await?;
        let now = Utc::now();

        let decision = self
            .policy
            .evaluate_tenant(&mut session.data.client, tenant, &email, now);
        let mut outcome = LoginOutcome {
            session_id: session.id.clone(),
            decision,
            user_id: None,
        };

        match decision {
            ThrottleDecision::AlreadyAuthorized => {
                outcome.user_id = session
                    .data
                    .client
                    .authorizations
                    .get(tenant)
                    .map(|a| a.user_id.clone());
                return Ok(outcome);
            }
            ThrottleDecision::LockedOut { remaining } => {
                warn!(
                    tenant = %tenant,
                    email = %email,
                    remaining_secs = remaining.num_seconds(),
                    "Tenant login locked out"
                );
                return Ok(outcome);
            }
            ThrottleDecision::Proceed { .. } => {}
        }

        self.persist(&mut session).await?;

        match verifier.verify(&email, &input.password).await? {
            Some(user_id) => {
                throttle::record_tenant_success(
                    &mut session.data.client,
                    tenant,
                    &email,
                    &user_id,
                    now,
                );
                self.persist(&mut session).await?;
                info!(tenant = %tenant, email = %email, user_id = %user_id, "Tenant login succeeded");
                outcome.user_id = Some(user_id);
            }
            None => warn!(tenant = %tenant, email = %email, ?decision, "Tenant login failed"),
        }

        Ok(outcome)
    }

    /// Revoke host authorization. Unknown or expired sessions are a no-op.
    pub async fn host_logout(&self, session_id: &str) -> GateResult<()> {
        let _guard = self.locks.lock(session_id).await;
        let Some(mut session) = self.sessions.get(session_id).await? else {
            return Ok(());
        };
        throttle::host_logout(&mut session.data.host);
        self.persist(&mut session).await?;
        debug!("Host session logged out");
        Ok(())
    }

    /// Revoke the session's authorization for `tenant` only.
    pub async fn tenant_logout(&self, session_id: &str, tenant: &str) -> GateResult<()> {
        let _guard = self.locks.lock(session_id).await;
        let Some(mut session) = self.sessions.get(session_id).await? else {
            return Ok(());
        };
        throttle::tenant_logout(&mut session.data.client, tenant);
        self.persist(&mut session).await?;
        debug!(tenant = %tenant, "Tenant session logged out");
        Ok(())
    }

    /// User id of the authorized host session, or
    /// [`GateError::Unauthorized`].
    pub async fn current_host_user(&self, session_id: Option<&str>) -> GateResult<String> {
        let session = self.load(session_id).await?;
        let host = session.data.host;
        match (host.authorized, host.user_id) {
            (true, Some(user_id)) => Ok(user_id),
            _ => Err(GateError::Unauthorized),
        }
    }

    /// User id the session is authorized as in `tenant`, or
    /// [`GateError::Unauthorized`].
    pub async fn current_tenant_user(
        &self,
        session_id: Option<&str>,
        tenant: &str,
    ) -> GateResult<String> {
        let session = self.load(session_id).await?;
        session
            .data
            .client
            .authorizations
            .get(tenant)
            .filter(|a| a.authorized)
            .map(|a| a.user_id.clone())
            .ok_or(GateError::Unauthorized)
    }

    /// Create a user in `users` after applying the login input rules.
    pub async fn register<U: UserRepository>(
        &self,
        users: &U,
        input: &LoginInput,
    ) -> GateResult<User> {
        let email = self.validate(input)?;
        if users.get_by_email(&email).await?.is_some() {
            return Err(GateError::DuplicateUser { email });
        }
        let user = users
            .create(CreateUser {
                email,
                password: input.password.clone(),
            })
            .await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    fn validate(&self, input: &LoginInput) -> GateResult<String> {
        let email = input.email.trim().to_lowercase();
        validation::validate_email(&email)?;
        validation::validate_password(&input.password, self.min_password_length)?;
        Ok(email)
    }

    /// Lock and load the session, minting a fresh one when the id is
    /// missing, unknown or expired. An expired row is deleted right away
    /// instead of waiting for the sweep.
    async fn checkout(&self, session_id: Option<&str>) -> GateResult<(Session, SessionGuard<'_>)> {
        if let Some(id) = session_id {
            let guard = self.locks.lock(id).await;
            if let Some(session) = self.sessions.get(id).await? {
                return Ok((session, guard));
            }
            self.sessions.delete(id).await?;
        }

        let session = self.sessions.create().await?;
        let guard = self.locks.lock(&session.id).await;
        debug!("New session created for login attempt");
        Ok((session, guard))
    }

    async fn load(&self, session_id: Option<&str>) -> GateResult<Session> {
        let id = session_id.ok_or(GateError::Unauthorized)?;
        self.sessions
            .get(id)
            .await?
            .ok_or(GateError::Unauthorized)
    }

    async fn persist(&self, session: &mut Session) -> GateResult<()> {
        session.data.updated_at = Utc::now();
        self.sessions.save(session).await
    }
}
