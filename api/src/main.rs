use api::auth::middleware::log_request;
use api::routes::routes;
use api::state::AppState;
use axum::{
    Router,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn_with_state,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::config;

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    // Connect database, session cache, push and mail
    let app_state = match AppState::connect().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise application state");
            eprintln!("Failed to start {}: {e}", config::project_name());
            std::process::exit(1);
        }
    };

    // Configure middleware
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    // Build app router
    let app = Router::new()
        .nest("/api", routes(app_state.clone()))
        .layer(from_fn_with_state(app_state.clone(), log_request))
        .layer(cors)
        .with_state(app_state.clone());

    // Start server
    let addr = format!("{}:{}", config::host(), config::port());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    println!(
        "Starting {} on http://{}",
        config::project_name(),
        addr
    );
    tracing::info!(%addr, env = %config::env(), "Server started");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(e) = served {
        tracing::error!(error = %e, "Server crashed");
    }

    if let Err(e) = app_state.close().await {
        tracing::warn!(error = %e, "Failed to close database connection");
    }
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(true)
    });

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("api=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}
