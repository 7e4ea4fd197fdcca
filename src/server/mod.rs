//! HTTP surface: the token endpoint, a liveness probe and the admin API.
//!
//! Store access is blocking, so every handler hands its store work to
//! `spawn_blocking` through [`run_blocking`].

pub mod admin;
pub mod auth;
pub mod error;
pub mod routes;

pub use error::{ApiError, ApiErrorBody};
pub use routes::build_router;

use crate::admin::LicenseAdmin;
use crate::manager::LeaseManager;
use crate::LeasegateError;
use auth::AdminGate;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Token issuance.
    pub manager: Arc<LeaseManager>,
    /// Admin operations.
    pub admin: Arc<LicenseAdmin>,
    /// Admin credential check; `None` disables the admin API.
    pub admin_gate: Option<Arc<AdminGate>>,
}

impl AppState {
    /// Assemble the state from its parts.
    pub fn new(manager: LeaseManager, admin: LicenseAdmin, admin_gate: Option<AdminGate>) -> Self {
        Self {
            manager: Arc::new(manager),
            admin: Arc::new(admin),
            admin_gate: admin_gate.map(Arc::new),
        }
    }
}

/// Run blocking store work off the async executor.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, LeasegateError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LeasegateError::StoreIO(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}
