//! Yatube server entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yatube_api::AppState;
use yatube_common::{Config, LocalStorage};

/// Largest accepted request body; base64 images make post bodies large.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config);

    info!("Starting yatube server...");

    let db = yatube_db::init(&config)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    info!("Running database migrations...");
    yatube_db::migrate(&db)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");

    let storage = Arc::new(LocalStorage::from_config(&config.media, &config.server.url));
    let state = AppState::new(Arc::new(db), &config, storage);

    if let Some(admin) = &config.admin {
        let user = state
            .user_service
            .ensure_admin(admin)
            .await
            .context("Failed to ensure administrator account")?;
        info!(username = %user.username, "Administrator account ready");
    }

    let mut app = Router::new().merge(yatube_api::app(state));

    // Media behind an absolute URL is served by someone else.
    let media_prefix = config.media.url.trim_matches('/');
    if !config.media.url.contains("://") && !media_prefix.is_empty() {
        app = app.nest_service(
            &format!("/{media_prefix}"),
            ServeDir::new(&config.media.root),
        );
    }

    let app = app
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
