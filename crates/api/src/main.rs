use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tailor_core::catalog::{default_slot_times, DEFAULT_SLOT_CAPACITY};
use tailor_db::repositories::{AppointmentRepo, TimeSlotRepo};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tailor_api::config::ServerConfig;
use tailor_api::router::build_app_router;
use tailor_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tailor_api=debug,tailor_events=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        booking_lock_timeout_ms = config.booking_lock_timeout_ms,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .map(|v| v.parse().expect("DB_MAX_CONNECTIONS must be a valid u32"))
        .unwrap_or(tailor_db::DEFAULT_MAX_CONNECTIONS);

    let pool = tailor_db::create_pool(&database_url, max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(max_connections, "Database connection pool created");

    tailor_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    tailor_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Slot catalog seed ---
    if config.seed_catalog {
        let inserted =
            TimeSlotRepo::seed_defaults(&pool, &default_slot_times(), DEFAULT_SLOT_CAPACITY)
                .await
                .expect("Failed to seed slot catalog");
        tracing::info!(inserted, "Slot catalog seeded");
    }

    // --- Lock anchor pruning ---
    let today = chrono::Local::now().date_naive();
    match AppointmentRepo::prune_slot_locks_before(&pool, today).await {
        Ok(pruned) => tracing::info!(pruned, %today, "Pruned past slot lock anchors"),
        Err(e) => tracing::warn!(error = %e, "Failed to prune slot lock anchors"),
    }

    // --- Event bus ---
    let event_bus = Arc::new(tailor_events::EventBus::default());
    let event_log_handle = tokio::spawn(tailor_events::EventLog::run(event_bus.subscribe()));
    tracing::info!("Event bus created");

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state clone of the bus) is gone once serve
    // returns; dropping the last sender closes the channel.
    drop(event_bus);
    let cleanup = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(cleanup, event_log_handle).await.is_err() {
        tracing::warn!("Event log did not drain before shutdown timeout");
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
