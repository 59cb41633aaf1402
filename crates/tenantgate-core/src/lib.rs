//! tenantgate core: domain models, error taxonomy and the collaborator
//! traits shared by every other crate in the workspace.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{GateError, GateResult};
