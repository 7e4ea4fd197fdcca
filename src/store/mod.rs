//! License persistence.
//!
//! The store is the only shared mutable state in leasegate. Every method is
//! atomic on its own; nothing spans calls.

pub mod sqlite;

pub use sqlite::SqliteLicenseStore;

use crate::license::key::generate_key;
use crate::license::{License, LicenseStatus};
use crate::LeasegateError;
use chrono::{DateTime, Utc};
use tracing::warn;

/// How many generated keys to try before giving up on `create`.
pub const KEY_GENERATION_ATTEMPTS: usize = 100;

/// Durable license records keyed by license key.
pub trait LicenseStore: Send + Sync {
    /// Look up a license. `Ok(None)` means the key does not exist.
    fn get(&self, license_key: &str) -> Result<Option<License>, LeasegateError>;

    /// Insert a new record.
    ///
    /// # Errors
    /// * `DuplicateKey` - a license with this key already exists
    /// * `StoreIO` - persistence failure
    fn insert(&self, license: &License) -> Result<(), LeasegateError>;

    /// Flip the enable/disable flag. `Ok(None)` means the key does not exist.
    ///
    /// Setting the flag to its current value succeeds and changes nothing.
    fn set_active(&self, license_key: &str, active: bool)
        -> Result<Option<License>, LeasegateError>;

    /// All licenses in insertion order.
    fn list(&self) -> Result<Vec<License>, LeasegateError>;

    /// Create an active license.
    ///
    /// With `license_key` set, the key is used as given and a collision is a
    /// `DuplicateKey` error. Without it, keys are generated until one inserts
    /// cleanly, at most [`KEY_GENERATION_ATTEMPTS`] times.
    fn create(
        &self,
        license_key: Option<&str>,
        duration_days: u32,
        note: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> Result<License, LeasegateError> {
        let build = |key: String| License {
            license_key: key,
            issued_at,
            duration_days,
            status: LicenseStatus::Active,
            note: note.map(str::to_string),
        };

        if let Some(key) = license_key {
            let license = build(key.to_string());
            self.insert(&license)?;
            return Ok(license);
        }

        for _ in 0..KEY_GENERATION_ATTEMPTS {
            let license = build(generate_key());
            match self.insert(&license) {
                Ok(()) => return Ok(license),
                Err(LeasegateError::DuplicateKey { key }) => {
                    warn!(%key, "generated license key collided, retrying");
                }
                Err(other) => return Err(other),
            }
        }

        Err(LeasegateError::KeyGenerationExhausted {
            attempts: KEY_GENERATION_ATTEMPTS,
        })
    }
}
