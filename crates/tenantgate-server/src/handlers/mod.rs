//! Route handlers for the master and tenant dashboards.

pub mod master;
pub mod tenant;

use axum::Json;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tenantgate_auth::{LoginInput, LoginOutcome, ThrottleDecision};
use tenantgate_core::error::GateError;
use tenantgate_core::models::user::User;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::CookieSettings;

/// Email and password, as posted to the login and create endpoints.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl From<Credentials> for LoginInput {
    fn from(c: Credentials) -> Self {
        LoginInput {
            email: c.email,
            password: c.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Respond to a login attempt. The session cookie is set on every
/// outcome so later attempts count against the same session.
pub(crate) fn login_response(cookies: &CookieSettings, outcome: LoginOutcome) -> Response {
    let cookie = [(header::SET_COOKIE, cookies.set_cookie(&outcome.session_id))];

    match outcome.check() {
        Ok(()) => {
            let message = match outcome.decision {
                ThrottleDecision::AlreadyAuthorized => "Already logged in",
                _ => "Logged in",
            };
            let body = LoginResponse {
                message,
                user_id: outcome.user_id,
            };
            (cookie, Json(body)).into_response()
        }
        Err(err @ GateError::InvalidCredentials) => {
            let remaining = match outcome.decision {
                ThrottleDecision::Proceed { remaining_attempts } => remaining_attempts,
                _ => 0,
            };
            (cookie, ApiError(err).with_attempts_left(remaining)).into_response()
        }
        Err(err) => (cookie, ApiError(err)).into_response(),
    }
}
