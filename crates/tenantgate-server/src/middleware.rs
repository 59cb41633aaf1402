//! Tenant resolution middleware.

use axum::extract::{Query, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Header naming the tenant explicitly.
pub const TENANT_HEADER: &str = "x-tenant";

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    tenant: Option<String>,
}

/// Resolve the request's tenant and attach it as a
/// [`ResolvedTenant`](tenantgate_tenant::ResolvedTenant) extension.
///
/// The `tenant` query parameter wins over the `X-Tenant` header, which
/// wins over the `Host` subdomain. Unresolvable requests are rejected
/// before reaching the handler.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let explicit = query.tenant.or_else(|| {
        req.headers()
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()));

    let tenant = state
        .resolver()
        .resolve_request(explicit.as_deref(), host.as_deref())
        .await
        .inspect_err(|e| {
            warn!(
                kind = e.kind(),
                tenant = ?explicit,
                host = ?host,
                "Tenant resolution failed"
            )
        })?;

    debug!(tenant = %tenant.record.subdomain_identifier, "Tenant resolved");
    req.extensions_mut().insert(tenant);
    Ok(next.run(req).await)
}
