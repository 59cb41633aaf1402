//! `/api/users` handlers. Every route runs behind tenant resolution.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use tenantgate_auth::PasswordVerifier;
use tenantgate_tenant::ResolvedTenant;

use super::{Credentials, MessageResponse, UserResponse, login_response};
use crate::error::ApiError;
use crate::session::SessionCookie;
use crate::state::{AppState, TenantHandle};

type Tenant = Extension<ResolvedTenant<TenantHandle>>;

pub async fn login(
    State(state): State<AppState>,
    Extension(tenant): Tenant,
    SessionCookie(session_id): SessionCookie,
    Json(body): Json<Credentials>,
) -> Result<Response, ApiError> {
    let verifier = PasswordVerifier::new(state.tenant_users(tenant.handle), state.pepper.clone());
    let outcome = state
        .logins
        .tenant_login(
            session_id.as_deref(),
            &tenant.record.subdomain_identifier,
            &body.into(),
            &verifier,
        )
        .await?;
    Ok(login_response(&state.cookies, outcome))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(tenant): Tenant,
    SessionCookie(session_id): SessionCookie,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(id) = session_id {
        state
            .logins
            .tenant_logout(&id, &tenant.record.subdomain_identifier)
            .await?;
    }
    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(tenant): Tenant,
    SessionCookie(session_id): SessionCookie,
) -> Result<Json<serde_json::Value>, ApiError> {
    let identifier = tenant.record.subdomain_identifier;
    let user_id = state
        .logins
        .current_tenant_user(session_id.as_deref(), &identifier)
        .await?;
    Ok(Json(json!({ "user_id": user_id, "tenant": identifier })))
}

/// Register a user in the resolved tenant's store.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(tenant): Tenant,
    Json(body): Json<Credentials>,
) -> Result<Response, ApiError> {
    let users = state.tenant_users(tenant.handle);
    let user = state.logins.register(&users, &body.into()).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}
