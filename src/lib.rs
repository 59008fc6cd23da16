mod config;
mod data_formats;
pub mod db_helpers;
pub mod errors;
mod handlers;
mod logging;
pub mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::AppConfig;
pub use data_formats::*;
use handlers::*;
pub use logging::init_logging;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::trace::TraceLayer;

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Shared by every handler through an `Extension` layer.
pub struct AppState {
    pub pool: SqlitePool,
    pub media_url: String,
}

fn with_state(app: Router, state: AppState) -> Router {
    app.layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_app(app: Router, address: SocketAddr, state: AppState) -> Result<()> {
    let server = axum::Server::try_bind(&address)
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server started on {}", address);
    server
        .serve(with_state(app, state).into_make_service())
        .await?;
    Ok(())
}

/// Serves on a listener the caller already holds, so the port cannot be
/// taken between choosing it and serving on it.
pub async fn serve_app(app: Router, listener: TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    let server = axum::Server::from_tcp(listener)
        .with_context(|| format!("Failed to serve on {}", address))?;
    tracing::info!("Server started on {}", address);
    server
        .serve(with_state(app, state).into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {}", db_url))?;
    } else {
        tracing::debug!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn bind_random_port() -> Result<TcpListener> {
    TcpListener::bind("127.0.0.1:0").context("Could not bind a free port")
}

pub fn make_router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/post/:slug", get(post_detail))
        .route("/tag/:tag_title", get(tag_filter))
        .route("/contacts", get(contacts))
        .route("/check_health", get(alive))
        .fallback(not_found)
}
