pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::auth::{AuthService, PasswordHasher, SessionManager};
use crate::db::UserStore;

pub use crate::config::Settings;
pub use crate::error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: PgPool,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        // Initialize database connection pool
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                AppError::DatabaseError(error::DatabaseError::ConnectionError(e.to_string()))
            })?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(error::DatabaseError::QueryError(e.to_string()))
            })?;

        let auth_service = AuthService::new(
            UserStore::new(db_pool.clone()),
            SessionManager::new(db_pool.clone(), config.auth.session_ttl_hours),
            PasswordHasher::default(),
        );

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            auth_service: Arc::new(auth_service),
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        // Close database connections
        self.db_pool.close().await;
        Ok(())
    }
}
