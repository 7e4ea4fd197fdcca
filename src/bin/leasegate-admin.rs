//! Leasegate admin CLI.
//!
//! Works directly on the database named by `DB_PATH`. Every command prints
//! one line of JSON on stdout; diagnostics go to stderr.
//!
//! Exit codes: `0` success, `2` invalid input, `1` anything else.

use clap::{Parser, Subcommand};
use leasegate::license::key::generate_key;
use leasegate::{CreateLicense, LeasegateConfig, LeasegateError, LicenseAdmin, SqliteLicenseStore};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "leasegate-admin")]
#[command(about = "Manage leasegate licenses")]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a license, active from now
    CreateLicense {
        /// Lifetime in days
        #[arg(long, allow_negative_numbers = true)]
        days: i64,
        /// Use this key instead of a generated one
        #[arg(long)]
        key: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },
    /// Disable a license
    DisableLicense {
        /// License key
        #[arg(long)]
        key: String,
    },
    /// Re-enable a license
    EnableLicense {
        /// License key
        #[arg(long)]
        key: String,
    },
    /// Print a random key (does not touch the database)
    GenerateKey,
    /// List every license
    ListLicenses,
    /// Show one license
    ShowLicense {
        /// License key
        #[arg(long)]
        key: String,
    },
}

#[derive(Serialize)]
struct GeneratedKey {
    license_key: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            if err.is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(command: Command) -> Result<String, LeasegateError> {
    match command {
        Command::CreateLicense { days, key, note } => {
            let license = open_admin()?.create_license(&CreateLicense { days, key, note })?;
            to_json(&license.summary())
        }
        Command::DisableLicense { key } => to_json(&open_admin()?.disable_license(&key)?),
        Command::EnableLicense { key } => to_json(&open_admin()?.enable_license(&key)?),
        // Pure; works without a database.
        Command::GenerateKey => to_json(&GeneratedKey {
            license_key: generate_key(),
        }),
        Command::ListLicenses => to_json(&open_admin()?.list_licenses()?),
        Command::ShowLicense { key } => to_json(&open_admin()?.show_license(&key)?),
    }
}

fn open_admin() -> Result<LicenseAdmin, LeasegateError> {
    let config = LeasegateConfig::from_env()?;
    let store = SqliteLicenseStore::open(&config.db_path)?;
    Ok(LicenseAdmin::new(Arc::new(store)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, LeasegateError> {
    serde_json::to_string(value)
        .map_err(|e| LeasegateError::ProtocolError(format!("Failed to encode output: {}", e)))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
