//! Leasegate configuration.
//!
//! Built once at process start from the environment and handed to the
//! constructors that need it. Nothing reads the environment after that.

use crate::LeasegateError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./data/licenses.db";

/// Default lease lifetime (one day).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 86_400;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// HTTP Basic credentials for the admin API.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Process-wide settings for the server and the admin CLI.
#[derive(Debug, Clone)]
pub struct LeasegateConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Lifetime of every issued lease, in seconds.
    pub token_ttl_seconds: u64,

    /// Address the HTTP server binds to.
    pub host: String,

    /// Port the HTTP server binds to.
    pub port: u16,

    /// Admin API credentials. `None` disables the admin API.
    pub admin: Option<AdminCredentials>,
}

impl Default for LeasegateConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            admin: None,
        }
    }
}

impl LeasegateConfig {
    /// Read configuration from process environment variables.
    ///
    /// Recognized: `DB_PATH`, `TOKEN_TTL_SECONDS`, `HOST`, `PORT`,
    /// `ADMIN_USERNAME`, `ADMIN_PASSWORD`.
    pub fn from_env() -> Result<Self, LeasegateError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LeasegateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let token_ttl_seconds = match lookup("TOKEN_TTL_SECONDS") {
            Some(raw) => parse_int::<u64>(&raw, "TOKEN_TTL_SECONDS")?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => parse_int::<u16>(&raw, "PORT")?,
            None => DEFAULT_PORT,
        };

        let username = non_blank(lookup("ADMIN_USERNAME"));
        let password = non_blank(lookup("ADMIN_PASSWORD"));
        let admin = match (username, password) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(LeasegateError::ConfigError(
                    "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        let config = Self {
            db_path: expand_home(Path::new(&db_path)),
            token_ttl_seconds,
            host,
            port,
            admin,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), LeasegateError> {
        if self.token_ttl_seconds < 1 {
            return Err(LeasegateError::ConfigError(
                "TOKEN_TTL_SECONDS must be >= 1".to_string(),
            ));
        }
        if i64::try_from(self.token_ttl_seconds).is_err() {
            return Err(LeasegateError::ConfigError(format!(
                "TOKEN_TTL_SECONDS is too large: {}",
                self.token_ttl_seconds
            )));
        }
        if self.port == 0 {
            return Err(LeasegateError::ConfigError(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(LeasegateError::ConfigError(
                "DB_PATH cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the admin API is enabled.
    pub fn admin_enabled(&self) -> bool {
        self.admin.is_some()
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_int<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, LeasegateError> {
    raw.trim().parse::<T>().map_err(|_| {
        LeasegateError::ConfigError(format!("{} must be an integer in range, got {:?}", name, raw))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
