use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use medcheck::config::AppConfig;
use medcheck::db;
use medcheck::handlers;
use medcheck::services::auth::http::HttpAuthProvider;
use medcheck::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    tracing::info!("delegating admin credential checks to {}", config.auth_url);
    let auth = HttpAuthProvider::new(config.auth_url.clone());

    let (booking_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        auth: Box::new(auth),
        booking_tx,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/bookings", post(handlers::bookings::submit_booking))
        .route(
            "/api/bookings/lookup",
            get(handlers::bookings::lookup_booking),
        )
        .route(
            "/api/bookings/events",
            get(handlers::bookings::booking_events),
        )
        .route("/api/admin/bookings", get(handlers::admin::list_bookings))
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route(
            "/api/admin/bookings/:id/approve",
            post(handlers::admin::approve_booking),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
