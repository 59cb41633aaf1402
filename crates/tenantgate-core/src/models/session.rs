//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::throttle::{ClientProfile, HostProfile};

/// Typed contents of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(default)]
    pub host: HostProfile,
    #[serde(default)]
    pub client: ClientProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            host: HostProfile::default(),
            client: ClientProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A session checked out of the store.
///
/// `id` is the raw token handed to the client; stores may key on a
/// digest of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub data: SessionDocument,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::throttle::AttemptRecord;

    #[test]
    fn document_survives_json_round_trip() {
        let now = Utc::now();
        let mut doc = SessionDocument::new(now);
        doc.host
            .login_attempts
            .insert("alice@example.com".into(), AttemptRecord::first(now));
        doc.client
            .login_attempts
            .entry("acme".into())
            .or_default()
            .insert("alice@example.com".into(), AttemptRecord::first(now));

        let json = serde_json::to_string(&doc).unwrap();
        let back: SessionDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }

    #[test]
    fn missing_profiles_default_to_empty() {
        let json = r#"{"created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}"#;
        let doc: SessionDocument = serde_json::from_str(json).unwrap();
        assert!(doc.host.login_attempts.is_empty());
        assert!(!doc.host.authorized);
        assert!(doc.client.authorizations.is_empty());
    }
}
