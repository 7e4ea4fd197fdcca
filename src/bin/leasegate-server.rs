//! Leasegate HTTP server.
//!
//! Usage:
//!   leasegate-server --port 8000
//!
//! Everything else comes from the environment (`DB_PATH`, `TOKEN_TTL_SECONDS`,
//! `ADMIN_USERNAME`, `ADMIN_PASSWORD`, ...).

use anyhow::{Context, Result};
use clap::Parser;
use leasegate::server::auth::AdminGate;
use leasegate::{
    build_router, AppState, LeaseManager, LeasegateConfig, LicenseAdmin, SqliteLicenseStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "leasegate-server")]
#[command(about = "Issue short-lived leases against stored licenses")]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = LeasegateConfig::from_env().context("invalid configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate().context("invalid configuration")?;

    let store = Arc::new(
        SqliteLicenseStore::open(&config.db_path)
            .with_context(|| format!("failed to open {}", config.db_path.display()))?,
    );
    let manager = LeaseManager::new(store.clone(), &config)?;
    let admin = LicenseAdmin::new(store);
    let gate = config.admin.as_ref().map(AdminGate::new);
    let app = build_router(AppState::new(manager, admin, gate));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(
        addr = %listener.local_addr()?,
        db_path = %config.db_path.display(),
        token_ttl_seconds = config.token_ttl_seconds,
        admin_enabled = config.admin_enabled(),
        "leasegate server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("leasegate server stopped");
    Ok(())
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

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
