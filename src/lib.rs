//! # Leasegate
//!
//! **License records and short-lived lease issuance for desktop and daemon clients.**
//!
//! An operator creates licenses (a key plus a lifetime in days) through the
//! admin CLI or the admin HTTP API. Clients exchange their key for a lease
//! at `POST /v1/token`; the server answers with either a lease valid for the
//! configured TTL or a denial naming the reason.
//!
//! ## Decision order
//!
//! - Unknown key: `not_found`
//! - Key disabled by an admin: `disabled` (even after expiry)
//! - `now >= issued_at + duration_days`: `expired`
//! - Otherwise a lease plus the calendar breakdown of the time left
//!
//! Denials are ordinary 200 responses with the same shape. Store failures
//! are 500s and never turn into denials.
//!
//! ## Quickstart (server side)
//!
//! ```no_run
//! use leasegate::{LeaseManager, LeasegateConfig, SqliteLicenseStore, TokenRequest};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), leasegate::LeasegateError> {
//!     let config = LeasegateConfig::from_env()?;
//!     let store = Arc::new(SqliteLicenseStore::open(&config.db_path)?);
//!     let manager = LeaseManager::new(store, &config)?;
//!
//!     let response = manager.issue_token(&TokenRequest::new("ABCD-EFGH-JKLM"))?;
//!     println!("allowed: {}", response.is_allowed());
//!     Ok(())
//! }
//! ```
//!
//! ## Quickstart (client side)
//!
//! ```no_run
//! use leasegate::{LeaseClient, TokenRequest};
//!
//! fn main() -> Result<(), leasegate::LeasegateError> {
//!     let client = LeaseClient::new("http://127.0.0.1:8000")?.with_app("myapp/1.0.0");
//!     let response = client.request_token(&TokenRequest::new("ABCD-EFGH-JKLM"))?;
//!     if response.is_allowed() {
//!         println!("lease granted at {}", response.server_time());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! - `DB_PATH` - SQLite file, default `./data/licenses.db`
//! - `TOKEN_TTL_SECONDS` - lease lifetime, default `86400`
//! - `HOST` / `PORT` - bind address, default `0.0.0.0:8000`
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` - enable the admin API
//!
//! See [`LeasegateConfig`] for details.

#![warn(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Domain
pub mod license;
pub mod policy;
pub mod store;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Operations
pub mod admin;
pub mod manager;

// HTTP surface
pub mod server;

// Re-exports for public API
pub use admin::{CreateLicense, LicenseAdmin, LicenseOverview, StatusChange};
pub use client::LeaseClient;
pub use clock::{Clock, SystemClock};
pub use config::{AdminCredentials, LeasegateConfig};
pub use errors::LeasegateError;
pub use license::{License, LicenseStatus, LicenseSummary};
pub use manager::LeaseManager;
pub use policy::access::{evaluate, Decision, DenialReason, Lease};
pub use policy::remaining::RemainingTime;
pub use protocol::models::{TokenRequest, TokenResponse};
pub use server::{build_router, AppState};
pub use store::{LicenseStore, SqliteLicenseStore};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
