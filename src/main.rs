mod config;
mod db;
mod domain;
mod error;
mod events;
mod export;
mod middleware;
mod services;
mod state;
mod web;

use crate::config::{Config, StoreKind};
use crate::db::{seed, MemoryStore, PgStore, PortalStore};
use crate::state::{AppState, SharedState};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let store = connect_store(&config).await?;

    if let Some(password) = config.seed_password.as_deref() {
        seed::seed_demo(store.as_ref(), password).await?;
    }

    let shared: SharedState = Arc::new(AppState::new(
        store,
        config.session_key.clone(),
        config.secure_cookies,
    ));
    tokio::spawn(events::log_auth_events(shared.auth_events.subscribe()));

    let scheduler = JobScheduler::new().await?;

    // Login limiter cleanup - drop idle IPs every hour
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let remaining = state.login_limiter.cleanup().await;
                tracing::debug!("Login limiter cleanup, {} IPs still tracked", remaining);
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started: login limiter cleanup hourly");

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn PortalStore>> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL missing"))?;
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    e
                })?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to run database migrations: {}", e);
                    e
                })?;
            tracing::info!("Database migrations completed");

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
