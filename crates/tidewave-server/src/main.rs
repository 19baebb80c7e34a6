mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tidewave_api::storage::Storage;
use tidewave_api::{AppState, AppStateInner};
use tidewave_core::Allocator;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidewave=debug,tidewave_api=debug,tidewave_db=info,tidewave_core=debug,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    let db = tidewave_db::Database::open(&config.db_path)?;
    let storage = Storage::new(config.media_dir.clone()).await?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        storage,
        jwt_secret: config.jwt_secret.clone(),
        allocator: Allocator::new(config.alloc_max_distance),
        max_insert_attempts: config.alloc_max_attempts,
        max_upload_bytes: config.max_upload_bytes,
    });

    let app = tidewave_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Tidewave listening on {}", addr);
    info!(
        "Id allocation: max distance {}, {} attempts",
        config.alloc_max_distance, config.alloc_max_attempts
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
