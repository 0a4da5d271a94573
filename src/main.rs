//! LitQuest notification server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use litquest_core::config::AppConfig;
use litquest_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("LITQUEST_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting LitQuest notification server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Database connection + migrations
    tracing::info!("Connecting to database...");
    let db = Arc::new(litquest_database::DatabasePool::connect(&config.database).await?);

    tracing::info!("Running database migrations...");
    litquest_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // Auth
    let jwt_decoder = Arc::new(litquest_auth::jwt::JwtDecoder::new(&config.auth));

    // Store + service
    let store = Arc::new(litquest_database::PgNotificationStore::new(
        db.pool().clone(),
    ));
    let notification_service =
        Arc::new(litquest_service::notification::NotificationService::new(store));

    // Real-time engine
    tracing::info!("Initializing realtime engine...");
    let engine = Arc::new(litquest_realtime::RealtimeEngine::new(
        config.realtime.clone(),
        Arc::clone(&notification_service),
        Arc::clone(&jwt_decoder),
    ));

    // Scheduled maintenance
    tracing::info!("Starting scheduler...");
    let mut scheduler = litquest_worker::CronScheduler::new(
        Arc::clone(&notification_service),
        config.notifications.clone(),
    )
    .await?;
    scheduler.register_default_tasks().await?;
    scheduler.start().await?;

    // HTTP server
    let app_state = litquest_api::AppState {
        config: Arc::new(config.clone()),
        db: Arc::clone(&db),
        jwt_decoder,
        engine,
    };

    let app = litquest_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("LitQuest server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    scheduler.shutdown().await?;
    db.close().await;

    tracing::info!("LitQuest server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
