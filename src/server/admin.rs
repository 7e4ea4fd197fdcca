//! Admin API handlers. Authentication happens in middleware before these run.

use crate::admin::{CreateLicense, LicenseOverview, StatusChange};
use crate::license::LicenseSummary;
use crate::server::{run_blocking, ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of `GET /admin/licenses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseListing {
    /// Every license with its time-left fields.
    pub licenses: Vec<LicenseOverview>,
    /// Lease lifetime the server is issuing with.
    pub token_ttl_seconds: u64,
}

/// Body of `POST /admin/licenses/generate-key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedKey {
    /// A key not currently in use.
    pub license_key: String,
}

/// GET /admin/licenses
pub async fn list_licenses(State(state): State<AppState>) -> Result<Json<LicenseListing>, ApiError> {
    let admin = state.admin.clone();
    let licenses = run_blocking(move || admin.overview()).await?;
    Ok(Json(LicenseListing {
        licenses,
        token_ttl_seconds: state.manager.token_ttl_seconds(),
    }))
}

/// POST /admin/licenses
pub async fn create_license(
    State(state): State<AppState>,
    Json(request): Json<CreateLicense>,
) -> Result<(StatusCode, Json<LicenseSummary>), ApiError> {
    let admin = state.admin.clone();
    let license = run_blocking(move || admin.create_license(&request)).await?;
    Ok((StatusCode::CREATED, Json(license.summary())))
}

/// GET /admin/licenses/{key}
pub async fn show_license(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LicenseSummary>, ApiError> {
    let admin = state.admin.clone();
    Ok(Json(run_blocking(move || admin.show_license(&key)).await?))
}

/// POST /admin/licenses/{key}/disable
pub async fn disable_license(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<StatusChange>, ApiError> {
    let admin = state.admin.clone();
    Ok(Json(run_blocking(move || admin.disable_license(&key)).await?))
}

/// POST /admin/licenses/{key}/enable
pub async fn enable_license(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<StatusChange>, ApiError> {
    let admin = state.admin.clone();
    Ok(Json(run_blocking(move || admin.enable_license(&key)).await?))
}

/// POST /admin/licenses/generate-key
pub async fn generate_key(State(state): State<AppState>) -> Result<Json<GeneratedKey>, ApiError> {
    let admin = state.admin.clone();
    let license_key = run_blocking(move || admin.suggest_key()).await?;
    Ok(Json(GeneratedKey { license_key }))
}
