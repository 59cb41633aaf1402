//! Login throttle engine.
//!
//! Pure functions over the throttle state carried in a session. Callers
//! load the session, evaluate, and persist before verifying credentials.
//! Every mutation happens on the profile passed in; nothing is shared.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tenantgate_core::models::throttle::{
    AttemptRecord, ClientProfile, HostProfile, TenantAuthorization,
};

/// Outcome of evaluating one login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The attempt was counted and may be verified. `remaining_attempts`
    /// is how many more will be admitted inside the window; zero means
    /// this is the last one.
    Proceed { remaining_attempts: u32 },
    /// The session is already authorized in this scope. Nothing counted.
    AlreadyAuthorized,
    /// Denied. The record is unchanged.
    LockedOut { remaining: Duration },
}

/// Attempt threshold and lockout window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::minutes(30),
        }
    }
}

impl ThrottlePolicy {
    /// Evaluate a master-dashboard attempt for `email`.
    pub fn evaluate_host(
        &self,
        profile: &mut HostProfile,
        email: &str,
        now: DateTime<Utc>,
    ) -> ThrottleDecision {
        if profile.authorized {
            return ThrottleDecision::AlreadyAuthorized;
        }
        self.count_attempt(&mut profile.login_attempts, email, now)
    }

    /// Evaluate a tenant-dashboard attempt for `email` against `tenant`.
    pub fn evaluate_tenant(
        &self,
        profile: &mut ClientProfile,
        tenant: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> ThrottleDecision {
        if profile.is_authorized(tenant) {
            return ThrottleDecision::AlreadyAuthorized;
        }
        let attempts = profile.login_attempts.entry(tenant.to_string()).or_default();
        self.count_attempt(attempts, email, now)
    }

    fn count_attempt(
        &self,
        attempts: &mut BTreeMap<String, AttemptRecord>,
        email: &str,
        now: DateTime<Utc>,
    ) -> ThrottleDecision {
        let Some(record) = attempts.get_mut(email) else {
            attempts.insert(email.to_string(), AttemptRecord::first(now));
            return self.proceed(1);
        };

        if record.attempt_count < self.max_attempts {
            record.attempt_count += 1;
            record.last_attempt_at = now;
            return self.proceed(record.attempt_count);
        }

        let elapsed = now - record.last_attempt_at;
        if elapsed > self.window {
            *record = AttemptRecord::first(now);
            return self.proceed(1);
        }

        ThrottleDecision::LockedOut {
            remaining: self.window - elapsed,
        }
    }

    fn proceed(&self, attempt_count: u32) -> ThrottleDecision {
        ThrottleDecision::Proceed {
            remaining_attempts: self.max_attempts.saturating_sub(attempt_count),
        }
    }
}

/// Mark the host profile authorized and clear the strikes for `email`.
pub fn record_host_success(
    profile: &mut HostProfile,
    email: &str,
    user_id: &str,
    now: DateTime<Utc>,
) {
    profile.authorized = true;
    profile.authorized_at = Some(now);
    profile.user_id = Some(user_id.to_string());
    if let Some(record) = profile.login_attempts.get_mut(email) {
        record.attempt_count = 0;
    }
}

/// Authorize the session for `tenant` and clear the strikes for `email`
/// in that tenant only.
pub fn record_tenant_success(
    profile: &mut ClientProfile,
    tenant: &str,
    email: &str,
    user_id: &str,
    now: DateTime<Utc>,
) {
    profile.authorizations.insert(
        tenant.to_string(),
        TenantAuthorization {
            authorized: true,
            authorized_at: now,
            user_id: user_id.to_string(),
        },
    );
    if let Some(record) = profile
        .login_attempts
        .get_mut(tenant)
        .and_then(|attempts| attempts.get_mut(email))
    {
        record.attempt_count = 0;
    }
}

/// Revoke host authorization. Attempt counters are kept.
pub fn host_logout(profile: &mut HostProfile) {
    profile.authorized = false;
    profile.authorized_at = None;
    profile.user_id = None;
}

/// Revoke the session's authorization for `tenant`. Attempt counters are
/// kept.
pub fn tenant_logout(profile: &mut ClientProfile, tenant: &str) {
    profile.authorizations.remove(tenant);
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "alice@example.com";
    const BOB: &str = "bob@example.com";

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn first_attempt_creates_record() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();

        let decision = policy.evaluate_host(&mut host, ALICE, t0());

        assert_eq!(
            decision,
            ThrottleDecision::Proceed {
                remaining_attempts: 2
            }
        );
        assert_eq!(host.login_attempts[ALICE], AttemptRecord::first(t0()));
    }

    #[test]
    fn third_attempt_admitted_fourth_locked() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();
        let mut now = t0();

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                policy.evaluate_host(&mut host, ALICE, now),
                ThrottleDecision::Proceed {
                    remaining_attempts: expected_remaining
                }
            );
            now += Duration::minutes(1);
        }
        assert_eq!(host.login_attempts[ALICE].attempt_count, 3);

        let locked = policy.evaluate_host(&mut host, ALICE, now);
        assert_eq!(
            locked,
            ThrottleDecision::LockedOut {
                remaining: Duration::minutes(29)
            }
        );
        // Denials do not touch the record.
        assert_eq!(host.login_attempts[ALICE].attempt_count, 3);
        assert_eq!(
            host.login_attempts[ALICE].last_attempt_at,
            t0() + Duration::minutes(2)
        );
    }

    #[test]
    fn lockout_expires_after_window() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();
        for _ in 0..3 {
            policy.evaluate_host(&mut host, ALICE, t0());
        }

        // Exactly at the boundary still locked.
        assert!(matches!(
            policy.evaluate_host(&mut host, ALICE, t0() + Duration::minutes(30)),
            ThrottleDecision::LockedOut { .. }
        ));

        let later = t0() + Duration::minutes(30) + Duration::seconds(1);
        assert_eq!(
            policy.evaluate_host(&mut host, ALICE, later),
            ThrottleDecision::Proceed {
                remaining_attempts: 2
            }
        );
        assert_eq!(host.login_attempts[ALICE], AttemptRecord::first(later));
    }

    #[test]
    fn success_resets_only_that_identity() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();
        policy.evaluate_host(&mut host, ALICE, t0());
        policy.evaluate_host(&mut host, ALICE, t0());
        policy.evaluate_host(&mut host, BOB, t0());

        record_host_success(&mut host, ALICE, "user-1", t0());

        assert_eq!(host.login_attempts[ALICE].attempt_count, 0);
        assert_eq!(host.login_attempts[BOB].attempt_count, 1);
        assert!(host.authorized);
        assert_eq!(host.user_id.as_deref(), Some("user-1"));
        assert_eq!(host.authorized_at, Some(t0()));
    }

    #[test]
    fn authorized_session_short_circuits() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();
        policy.evaluate_host(&mut host, ALICE, t0());
        record_host_success(&mut host, ALICE, "user-1", t0());
        let before = host.clone();

        assert_eq!(
            policy.evaluate_host(&mut host, ALICE, t0()),
            ThrottleDecision::AlreadyAuthorized
        );
        assert_eq!(host, before);
    }

    #[test]
    fn tenant_success_resets_only_that_tenant() {
        let policy = ThrottlePolicy::default();
        let mut client = ClientProfile::default();
        policy.evaluate_tenant(&mut client, "acme", ALICE, t0());
        policy.evaluate_tenant(&mut client, "globex", ALICE, t0());
        policy.evaluate_tenant(&mut client, "globex", ALICE, t0());

        record_tenant_success(&mut client, "acme", ALICE, "u-acme", t0());

        assert_eq!(client.attempts("acme", ALICE).unwrap().attempt_count, 0);
        assert_eq!(client.attempts("globex", ALICE).unwrap().attempt_count, 2);
        assert!(client.is_authorized("acme"));
        assert!(!client.is_authorized("globex"));
    }

    #[test]
    fn tenant_authorization_is_per_tenant() {
        let policy = ThrottlePolicy::default();
        let mut client = ClientProfile::default();
        record_tenant_success(&mut client, "acme", ALICE, "u-acme", t0());

        assert_eq!(
            policy.evaluate_tenant(&mut client, "acme", ALICE, t0()),
            ThrottleDecision::AlreadyAuthorized
        );
        assert!(matches!(
            policy.evaluate_tenant(&mut client, "globex", ALICE, t0()),
            ThrottleDecision::Proceed { .. }
        ));
    }

    #[test]
    fn host_and_tenant_profiles_are_independent() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();
        let mut client = ClientProfile::default();
        for _ in 0..3 {
            policy.evaluate_host(&mut host, ALICE, t0());
        }
        assert!(matches!(
            policy.evaluate_host(&mut host, ALICE, t0()),
            ThrottleDecision::LockedOut { .. }
        ));

        assert!(matches!(
            policy.evaluate_tenant(&mut client, "acme", ALICE, t0()),
            ThrottleDecision::Proceed { .. }
        ));

        for _ in 0..3 {
            policy.evaluate_tenant(&mut client, "globex", BOB, t0());
        }
        assert!(matches!(
            policy.evaluate_tenant(&mut client, "globex", BOB, t0()),
            ThrottleDecision::LockedOut { .. }
        ));
        assert!(matches!(
            policy.evaluate_host(&mut host, BOB, t0()),
            ThrottleDecision::Proceed { .. }
        ));
    }

    #[test]
    fn logout_keeps_counters() {
        let policy = ThrottlePolicy::default();
        let mut host = HostProfile::default();
        let mut client = ClientProfile::default();
        policy.evaluate_host(&mut host, ALICE, t0());
        policy.evaluate_host(&mut host, BOB, t0());
        record_host_success(&mut host, ALICE, "user-1", t0());
        policy.evaluate_tenant(&mut client, "acme", ALICE, t0());
        record_tenant_success(&mut client, "acme", ALICE, "u-acme", t0());

        host_logout(&mut host);
        tenant_logout(&mut client, "acme");

        assert!(!host.authorized);
        assert!(host.user_id.is_none());
        assert_eq!(host.login_attempts[BOB].attempt_count, 1);
        assert!(!client.is_authorized("acme"));
        assert!(client.attempts("acme", ALICE).is_some());
    }

    #[test]
    fn custom_policy_is_honored() {
        let policy = ThrottlePolicy {
            max_attempts: 1,
            window: Duration::minutes(5),
        };
        let mut host = HostProfile::default();

        assert_eq!(
            policy.evaluate_host(&mut host, ALICE, t0()),
            ThrottleDecision::Proceed {
                remaining_attempts: 0
            }
        );
        assert_eq!(
            policy.evaluate_host(&mut host, ALICE, t0() + Duration::minutes(1)),
            ThrottleDecision::LockedOut {
                remaining: Duration::minutes(4)
            }
        );
    }
}
