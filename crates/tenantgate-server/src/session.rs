//! Session cookie handling.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

pub const SESSION_COOKIE: &str = "connect.s.id";

/// Value of the session cookie, if the request carries one.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extractor for the session cookie. Never rejects.
#[derive(Debug, Clone)]
pub struct SessionCookie(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_id(&parts.headers)))
    }
}

/// Attributes of the `Set-Cookie` header issued on login.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub max_age_secs: i64,
    pub secure: bool,
}

impl CookieSettings {
    pub fn set_cookie(&self, session_id: &str) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{SESSION_COOKIE}={session_id}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{secure}",
            self.max_age_secs
        )
    }
}
