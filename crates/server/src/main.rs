//! Fairweather server.
//!
//! Serves the authentication and favorite-city API consumed by the Fairweather
//! weather client.
//!
//! # Backends
//!
//! - `PostgreSQL` for favorites and sessions when `FAIRWEATHER_DATABASE_URL`
//!   (or `DATABASE_URL`) is set; in-memory stores otherwise
//! - A GoTrue-compatible identity provider when `IDENTITY_URL` is set; an
//!   in-memory provider otherwise

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use fairweather_server::config::ServerConfig;
use fairweather_server::db::{self, FavoritesStore, MemoryFavoritesStore, PgFavoritesStore};
use fairweather_server::middleware::{create_cors_layer, create_session_layer};
use fairweather_server::services::{GoTrueProvider, IdentityProvider, MemoryIdentityProvider};
use fairweather_server::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fairweather_server=info,tower_http=debug".into());

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let identity_provider: Arc<dyn IdentityProvider> = match &config.identity {
        Some(identity) => {
            tracing::info!(url = %identity.url, "Using GoTrue identity provider");
            Arc::new(
                GoTrueProvider::from_config(identity)
                    .expect("Failed to create identity provider client"),
            )
        }
        None => {
            tracing::warn!("IDENTITY_URL not set; using in-memory identity provider");
            Arc::new(MemoryIdentityProvider::new())
        }
    };

    let cors = create_cors_layer(&config.client_origin).expect("Invalid CORS origin");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p fairweather-cli -- migrate
    let app = if let Some(database_url) = &config.database_url {
        let pool = db::create_pool(database_url)
            .await
            .expect("Failed to create database pool");
        tracing::info!("Database pool created");

        let favorites: Arc<dyn FavoritesStore> = Arc::new(PgFavoritesStore::new(pool.clone()));
        let state = AppState::new(identity_provider, favorites);
        let session_layer = create_session_layer(PostgresStore::new(pool), &config);

        fairweather_server::build_router(state, session_layer, cors)
    } else {
        tracing::warn!("No database configured; favorites and sessions are kept in memory");

        let favorites: Arc<dyn FavoritesStore> = Arc::new(MemoryFavoritesStore::new());
        let state = AppState::new(identity_provider, favorites);
        let session_layer = create_session_layer(MemoryStore::default(), &config);

        fairweather_server::build_router(state, session_layer, cors)
    };

    // Start server
    let addr = config.socket_addr();
    tracing::info!("fairweather listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
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
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
