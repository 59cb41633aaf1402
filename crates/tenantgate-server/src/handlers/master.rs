//! `/master/api/users` handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{Credentials, MessageResponse, UserResponse, login_response};
use crate::error::ApiError;
use crate::session::SessionCookie;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub identifier: String,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub tenant_id: Uuid,
    pub identifier: String,
    pub created_at: DateTime<Utc>,
}

pub async fn login(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
    Json(body): Json<Credentials>,
) -> Result<Response, ApiError> {
    let outcome = state
        .logins
        .host_login(session_id.as_deref(), &body.into())
        .await?;
    Ok(login_response(&state.cookies, outcome))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(id) = session_id {
        state.logins.host_logout(&id).await?;
    }
    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}

pub async fn current_user(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = state.logins.current_host_user(session_id.as_deref()).await?;
    Ok(Json(json!({ "user_id": user_id })))
}

/// Create another dashboard operator. Requires an authorized session.
pub async fn create_user(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
    Json(body): Json<Credentials>,
) -> Result<Response, ApiError> {
    state.logins.current_host_user(session_id.as_deref()).await?;
    let user = state
        .logins
        .register(&state.master_users, &body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

pub async fn create_tenant(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
    Json(body): Json<CreateTenantRequest>,
) -> Result<Response, ApiError> {
    state.logins.current_host_user(session_id.as_deref()).await?;
    let record = state.provisioner.provision(&body.identifier).await?;
    let body = TenantResponse {
        tenant_id: record.tenant_id,
        identifier: record.subdomain_identifier,
        created_at: record.created_at,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}
