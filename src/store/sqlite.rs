//! SQLite-backed license store.
//!
//! One connection behind a mutex. Each trait call holds the lock for its
//! whole duration, which is what makes `set_active` (update + read back)
//! atomic with respect to other calls.

use crate::license::{License, LicenseStatus};
use crate::protocol::timestamp::{format_timestamp, parse_timestamp};
use crate::store::LicenseStore;
use crate::LeasegateError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT license_key, issued_at, duration_days, status, note FROM licenses";

/// License store in a single SQLite file.
#[derive(Clone)]
pub struct SqliteLicenseStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLicenseStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, LeasegateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LeasegateError::StoreIO(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            LeasegateError::StoreIO(format!("Failed to open {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "opened license database");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, LeasegateError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| LeasegateError::StoreIO(format!("Failed to open in-memory db: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LeasegateError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), LeasegateError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS licenses (
                license_key TEXT PRIMARY KEY,
                issued_at TEXT NOT NULL,
                duration_days INTEGER NOT NULL CHECK(duration_days >= 1),
                status TEXT NOT NULL CHECK(status IN ('active', 'disabled')),
                note TEXT NULL
            );
            ",
        )
        .map_err(|e| LeasegateError::StoreIO(format!("Failed to init schema: {}", e)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LeasegateError> {
        self.conn
            .lock()
            .map_err(|_| LeasegateError::StoreIO("Database connection lock poisoned".to_string()))
    }

    fn fetch(conn: &Connection, license_key: &str) -> Result<Option<License>, LeasegateError> {
        let raw = conn
            .query_row(
                &format!("{} WHERE license_key = ?1", SELECT_COLUMNS),
                params![license_key],
                RawLicense::from_row,
            )
            .optional()
            .map_err(|e| LeasegateError::StoreIO(format!("Failed to query license: {}", e)))?;

        raw.map(RawLicense::into_license).transpose()
    }
}

impl LicenseStore for SqliteLicenseStore {
    fn get(&self, license_key: &str) -> Result<Option<License>, LeasegateError> {
        let conn = self.lock()?;
        Self::fetch(&conn, license_key)
    }

    fn insert(&self, license: &License) -> Result<(), LeasegateError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO licenses (license_key, issued_at, duration_days, status, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                license.license_key,
                format_timestamp(&license.issued_at),
                license.duration_days,
                license.status.as_str(),
                license.note,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                LeasegateError::DuplicateKey {
                    key: license.license_key.clone(),
                }
            }
            other => LeasegateError::StoreIO(format!("Failed to insert license: {}", other)),
        })?;
        Ok(())
    }

    fn set_active(
        &self,
        license_key: &str,
        active: bool,
    ) -> Result<Option<License>, LeasegateError> {
        let conn = self.lock()?;
        let status = LicenseStatus::from_active(active);
        let updated = conn
            .execute(
                "UPDATE licenses SET status = ?1 WHERE license_key = ?2",
                params![status.as_str(), license_key],
            )
            .map_err(|e| LeasegateError::StoreIO(format!("Failed to update license: {}", e)))?;

        if updated == 0 {
            return Ok(None);
        }
        Self::fetch(&conn, license_key)
    }

    fn list(&self) -> Result<Vec<License>, LeasegateError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{} ORDER BY rowid ASC", SELECT_COLUMNS))
            .map_err(|e| LeasegateError::StoreIO(format!("Failed to prepare list query: {}", e)))?;

        let rows = stmt
            .query_map([], RawLicense::from_row)
            .map_err(|e| LeasegateError::StoreIO(format!("Failed to list licenses: {}", e)))?;

        let mut licenses = Vec::new();
        for row in rows {
            let raw =
                row.map_err(|e| LeasegateError::StoreIO(format!("Failed to read row: {}", e)))?;
            licenses.push(raw.into_license()?);
        }
        Ok(licenses)
    }
}

/// Row as stored, before parsing.
struct RawLicense {
    license_key: String,
    issued_at: String,
    duration_days: i64,
    status: String,
    note: Option<String>,
}

impl RawLicense {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            license_key: row.get(0)?,
            issued_at: row.get(1)?,
            duration_days: row.get(2)?,
            status: row.get(3)?,
            note: row.get(4)?,
        })
    }

    fn into_license(self) -> Result<License, LeasegateError> {
        let corrupt = |what: &str, detail: String| {
            LeasegateError::StoreIO(format!(
                "Corrupt {} for license {}: {}",
                what, self.license_key, detail
            ))
        };

        let issued_at =
            parse_timestamp(&self.issued_at).map_err(|e| corrupt("issued_at", e.to_string()))?;
        let duration_days = u32::try_from(self.duration_days)
            .map_err(|e| corrupt("duration_days", e.to_string()))?;
        let status = self
            .status
            .parse::<LicenseStatus>()
            .map_err(|e| corrupt("status", e))?;

        Ok(License {
            license_key: self.license_key,
            issued_at,
            duration_days,
            status,
            note: self.note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn license(key: &str) -> License {
        License {
            license_key: key.to_string(),
            issued_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
            duration_days: 30,
            status: LicenseStatus::Active,
            note: Some("demo".to_string()),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        store.insert(&license("ABCD-EFGH-JKLM")).unwrap();

        let loaded = store.get("ABCD-EFGH-JKLM").unwrap().unwrap();
        assert_eq!(loaded, license("ABCD-EFGH-JKLM"));
    }

    #[test]
    fn test_get_missing() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        assert!(store.get("NOPE-NOPE-NOPE").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        store.insert(&license("ABCD-EFGH-JKLM")).unwrap();

        let result = store.insert(&license("ABCD-EFGH-JKLM"));
        assert!(matches!(result, Err(LeasegateError::DuplicateKey { key }) if key == "ABCD-EFGH-JKLM"));
    }

    #[test]
    fn test_check_constraint_is_not_duplicate() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        let mut bad = license("ZERO-DAYS-0000");
        bad.duration_days = 0;

        let result = store.insert(&bad);
        assert!(matches!(result, Err(LeasegateError::StoreIO(_))));
    }

    #[test]
    fn test_set_active_is_idempotent() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        store.insert(&license("ABCD-EFGH-JKLM")).unwrap();

        let first = store.set_active("ABCD-EFGH-JKLM", false).unwrap().unwrap();
        let second = store.set_active("ABCD-EFGH-JKLM", false).unwrap().unwrap();
        assert_eq!(first.status, LicenseStatus::Disabled);
        assert_eq!(second.status, LicenseStatus::Disabled);

        let enabled = store.set_active("ABCD-EFGH-JKLM", true).unwrap().unwrap();
        assert_eq!(enabled.status, LicenseStatus::Active);
        // Nothing else changes.
        assert_eq!(enabled.issued_at, license("X").issued_at);
        assert_eq!(enabled.duration_days, 30);
    }

    #[test]
    fn test_set_active_missing() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        assert!(store.set_active("MISS-ING1-KEY2", false).unwrap().is_none());
    }

    #[test]
    fn test_list_in_insertion_order() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        for key in ["ZZZZ-0001", "AAAA-0002", "MMMM-0003"] {
            store.insert(&license(key)).unwrap();
        }

        let keys: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|l| l.license_key)
            .collect();
        assert_eq!(keys, ["ZZZZ-0001", "AAAA-0002", "MMMM-0003"]);
    }

    #[test]
    fn test_create_generates_key() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        let issued_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let created = store.create(None, 7, Some("trial"), issued_at).unwrap();
        assert_eq!(created.license_key.len(), 14);
        assert_eq!(created.status, LicenseStatus::Active);
        assert_eq!(store.get(&created.license_key).unwrap(), Some(created));
    }

    #[test]
    fn test_open_creates_parent_dirs_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/licenses.db");

        {
            let store = SqliteLicenseStore::open(&path).unwrap();
            store.insert(&license("ABCD-EFGH-JKLM")).unwrap();
        }

        let reopened = SqliteLicenseStore::open(&path).unwrap();
        assert!(reopened.get("ABCD-EFGH-JKLM").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_row_is_store_error() {
        let store = SqliteLicenseStore::open_in_memory().unwrap();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO licenses (license_key, issued_at, duration_days, status, note)
                 VALUES ('BAD1', 'yesterday', 3, 'active', NULL)",
                [],
            )
            .unwrap();

        let result = store.get("BAD1");
        assert!(matches!(result, Err(LeasegateError::StoreIO(msg)) if msg.contains("issued_at")));
    }
}
