//! SurrealDB repository implementations.

pub mod session;
mod tenant;
mod user;

pub use session::SurrealSessionStore;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
