//! tenantgate server: HTTP surface for the master dashboard and the
//! tenant dashboards.
//!
//! `/master/api/users/*` serves dashboard operators against the master
//! store. `/api/users/*` resolves the tenant from the request first and
//! serves that tenant's users from its own store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;

use axum::Router;
use axum::routing::{get, post};

pub use config::{ConfigError, ServerConfig};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let master = Router::new()
        .route("/login", post(handlers::master::login))
        .route("/logout", post(handlers::master::logout))
        .route("/create", post(handlers::master::create_user))
        .route("/createNewTenant", post(handlers::master::create_tenant))
        .route("/getCurrentUser", get(handlers::master::current_user));

    let tenant = Router::new()
        .route("/login", post(handlers::tenant::login))
        .route("/logout", post(handlers::tenant::logout))
        .route("/create", post(handlers::tenant::create_user))
        .route("/getCurrentUser", get(handlers::tenant::current_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_tenant,
        ));

    Router::new()
        .nest("/master/api/users", master)
        .nest("/api/users", tenant)
        .with_state(state)
}
