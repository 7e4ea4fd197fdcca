//! Shared helpers for the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use leasegate::server::auth::AdminGate;
use leasegate::{
    build_router, AdminCredentials, AppState, Clock, LeaseManager, LeasegateConfig,
    LeasegateError, License, LicenseAdmin, LicenseStatus, LicenseStore, SqliteLicenseStore,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse";

/// Clock frozen at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn license(key: &str, issued_at: &str, duration_days: u32, status: LicenseStatus) -> License {
    License {
        license_key: key.to_string(),
        issued_at: at(issued_at),
        duration_days,
        status,
        note: None,
    }
}

/// A running server backed by a temporary database.
pub struct TestServer {
    pub base: String,
    pub store: Arc<SqliteLicenseStore>,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// Spin up the router on an OS-assigned port with the clock frozen at `now`.
pub async fn spawn_server(now: &str, admin_enabled: bool) -> TestServer {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteLicenseStore::open(&dir.path().join("licenses.db")).unwrap());
    let base = serve_store(store.clone(), now, admin_enabled).await;

    TestServer {
        base,
        store,
        _dir: dir,
    }
}

/// Serve `store` on an OS-assigned port and return the base URL.
pub async fn serve_store(store: Arc<dyn LicenseStore>, now: &str, admin_enabled: bool) -> String {
    let config = LeasegateConfig {
        admin: admin_enabled.then(|| AdminCredentials {
            username: ADMIN_USER.to_string(),
            password: ADMIN_PASS.to_string(),
        }),
        ..LeasegateConfig::default()
    };

    let clock: Arc<dyn Clock> = Arc::new(FixedClock(at(now)));
    let manager = LeaseManager::with_clock(store.clone(), &config, clock.clone()).unwrap();
    let admin = LicenseAdmin::with_clock(store, clock);
    let gate = config.admin.as_ref().map(AdminGate::new);
    let app = build_router(AppState::new(manager, admin, gate));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Store whose every call fails as if the database were unavailable.
pub struct UnavailableStore;

impl LicenseStore for UnavailableStore {
    fn get(&self, _: &str) -> Result<Option<License>, LeasegateError> {
        Err(LeasegateError::StoreIO("unable to open database file".into()))
    }

    fn insert(&self, _: &License) -> Result<(), LeasegateError> {
        Err(LeasegateError::StoreIO("unable to open database file".into()))
    }

    fn set_active(&self, _: &str, _: bool) -> Result<Option<License>, LeasegateError> {
        Err(LeasegateError::StoreIO("unable to open database file".into()))
    }

    fn list(&self) -> Result<Vec<License>, LeasegateError> {
        Err(LeasegateError::StoreIO("unable to open database file".into()))
    }
}

/// The worked example: 30 days from 2026-02-01T00:00:00Z.
pub fn seed_scenario(store: &dyn LicenseStore) {
    store
        .insert(&license(
            "ABCD-EFGH-JKLM",
            "2026-02-01T00:00:00Z",
            30,
            LicenseStatus::Active,
        ))
        .unwrap();
}
