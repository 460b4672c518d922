//! lodebook roster reconciliation daemon
//!
//! Periodically reconciles the live Free Company roster against the
//! persisted snapshot, recording membership transitions and delivering
//! roster events to the configured webhook.

mod config;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use config::Config;
use lodebook_core::error::SyncError;
use lodebook_core::rank::RankTable;
use lodebook_db::PgRosterStore;
use lodebook_lodestone::{LodestoneClient, LodestoneConfig};
use lodebook_sync::{SyncConfig, SyncEngine, WebhookConfig, WebhookPublisher};

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values).
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.log_filter);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        free_company_id = %config.free_company_id,
        interval_secs = config.sync_interval_secs,
        min_roster_size = config.min_roster_size,
        "Starting lodebook sync daemon"
    );

    // Create database connection pool.
    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = lodebook_db::run_migrations(&pool).await {
        eprintln!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    let source = {
        let mut lodestone =
            LodestoneConfig::new(&config.lodestone_api_url, &config.free_company_id);
        if let Some(key) = &config.lodestone_api_key {
            lodestone = lodestone.with_api_key(key);
        }
        match LodestoneClient::new(lodestone) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                eprintln!("Invalid Lodestone configuration: {e}");
                std::process::exit(1);
            }
        }
    };

    let publisher = match WebhookPublisher::new(WebhookConfig::new(
        &config.webhook_url,
        &config.webhook_api_key,
    )) {
        Ok(publisher) => Arc::new(publisher),
        Err(e) => {
            eprintln!("Invalid webhook configuration: {e}");
            std::process::exit(1);
        }
    };

    let engine = SyncEngine::new(
        source,
        Arc::new(PgRosterStore::new(pool)),
        publisher,
        RankTable::from_ordered(config.rank_hierarchy.clone()),
    )
    .with_config(SyncConfig {
        min_roster_size: config.min_roster_size,
    });

    // One cycle per tick, strictly sequential: a tick that fires while a
    // cycle is still running is skipped, so cycles never overlap within
    // this process. The first tick fires immediately (run on startup).
    let mut ticker = interval(Duration::from_secs(config.sync_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_once(&engine).await,
            () = shutdown_signal() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("lodebook sync daemon stopped");
}

async fn run_once(engine: &SyncEngine) {
    match engine.run_cycle().await {
        Ok(report) => {
            if report.is_quiet() {
                info!(members_seen = report.members_seen, "Roster unchanged");
            }
        }
        Err(error @ SyncError::DataQuality { .. }) => {
            // Likely a degraded upstream fetch; the next tick retries.
            warn!(code = error.error_code(), error = %error, "Cycle skipped");
        }
        Err(error) => {
            error!(
                code = error.error_code(),
                error = %error,
                pre_mutation = error.aborts_before_mutation(),
                "Cycle failed"
            );
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
