//! SurrealDB implementation of [`SessionStore`].
//!
//! Sessions are keyed by the SHA-256 of the token given to the client, so
//! a leaked database dump does not hand out live session cookies. The
//! typed [`SessionDocument`] is stored as a JSON string, which keeps the
//! round trip exact for nested throttle maps and timestamps.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantgate_core::error::GateResult;
use tenantgate_core::models::session::{Session, SessionDocument};
use tenantgate_core::repository::SessionStore;
use tracing::debug;

use crate::error::DbError;

/// Generate a cryptographically random opaque session token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw session token, hex-encoded.
///
/// This is the record key of the `http_session` table.
pub fn hash_session_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, SurrealValue)]
struct PayloadRow {
    payload: String,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB-backed session store.
#[derive(Clone)]
pub struct SurrealSessionStore<C: Connection> {
    db: Surreal<C>,
    max_age: Duration,
}

impl<C: Connection> SurrealSessionStore<C> {
    /// Sessions untouched for longer than `max_age` are treated as absent
    /// by [`SessionStore::get`] and removed by the sweep.
    pub fn new(db: Surreal<C>, max_age: Duration) -> Self {
        Self { db, max_age }
    }
}

impl<C: Connection> SessionStore for SurrealSessionStore<C> {
    async fn create(&self) -> GateResult<Session> {
        let id = generate_session_token();
        let data = SessionDocument::new(Utc::now());
        let payload = serde_json::to_string(&data).map_err(DbError::from)?;

        self.db
            .query(
                "CREATE type::record('http_session', $key) SET \
                 payload = $payload, \
                 created_at = time::now(), \
                 updated_at = time::now()",
            )
            .bind(("key", hash_session_token(&id)))
            .bind(("payload", payload))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!("Session created");

        Ok(Session { id, data })
    }

    async fn get(&self, id: &str) -> GateResult<Option<Session>> {
        let cutoff: DateTime<Utc> = Utc::now() - self.max_age;

        let mut result = self
            .db
            .query(
                "SELECT payload FROM type::record('http_session', $key) \
                 WHERE updated_at >= $cutoff",
            )
            .bind(("key", hash_session_token(id)))
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PayloadRow> = result.take(0).map_err(DbError::from)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let data: SessionDocument = serde_json::from_str(&row.payload).map_err(DbError::from)?;

        Ok(Some(Session {
            id: id.to_string(),
            data,
        }))
    }

    async fn save(&self, session: &Session) -> GateResult<()> {
        let payload = serde_json::to_string(&session.data).map_err(DbError::from)?;

        // UPSERT: a session swept while a request held it is recreated.
        self.db
            .query(
                "UPSERT type::record('http_session', $key) SET \
                 payload = $payload, \
                 updated_at = time::now()",
            )
            .bind(("key", hash_session_token(&session.id)))
            .bind(("payload", payload))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> GateResult<()> {
        self.db
            .query("DELETE type::record('http_session', $key)")
            .bind(("key", hash_session_token(id)))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn cleanup_expired(&self, max_age: Duration) -> GateResult<u64> {
        let cutoff: DateTime<Utc> = Utc::now() - max_age;

        // Count expired sessions first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM http_session \
                 WHERE updated_at < $cutoff GROUP ALL",
            )
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE http_session WHERE updated_at < $cutoff")
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
