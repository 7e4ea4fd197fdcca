//! Route table and the public handlers.

use crate::protocol::models::{TokenRequest, TokenResponse};
use crate::server::{admin, auth, run_blocking, ApiError, AppState};
use axum::extract::State;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};

/// Build the complete router.
///
/// ```text
/// POST /v1/token
/// GET  /healthz
/// /admin/...   (Basic auth)
/// ```
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/licenses",
            get(admin::list_licenses).post(admin::create_license),
        )
        .route("/licenses/generate-key", post(admin::generate_key))
        .route("/licenses/{key}", get(admin::show_license))
        .route("/licenses/{key}/disable", post(admin::disable_license))
        .route("/licenses/{key}/enable", post(admin::enable_license))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/v1/token", post(issue_token))
        .route("/healthz", get(healthz))
        .nest("/admin", admin_routes)
        .with_state(state)
}

/// POST /v1/token
///
/// Every decision, allowed or denied, is a 200.
async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let manager = state.manager.clone();
    let response = run_blocking(move || manager.issue_token(&request)).await?;
    Ok(Json(response))
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}
