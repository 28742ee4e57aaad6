use crate::db::models::Session;
use crate::error::AppError;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use sqlx::PgPool;
use tracing::debug;

const TOKEN_LEN: usize = 64;

/// Issues, validates, and destroys session tokens. Owns all access to the
/// `sessions` table.
#[derive(Clone)]
pub struct SessionManager {
    pool: PgPool,
    ttl_hours: i64,
}

impl SessionManager {
    pub fn new(pool: PgPool, ttl_hours: i64) -> Self {
        Self { pool, ttl_hours }
    }

    pub async fn create(&self, user_id: i32) -> Result<Session, AppError> {
        let session = Session::new(user_id, generate_token(), self.ttl_hours);
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, token, created_at, expires_at, last_activity)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.last_activity)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    /// Resolves a token to its user id. Fails closed: unknown and expired
    /// tokens both come back as `None`. An expired row found here is
    /// deleted on the spot rather than waiting for the sweep.
    pub async fn validate(&self, token: &str) -> Result<Option<i32>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, created_at, expires_at, last_activity \
             FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let session = match session {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            debug!("evicting expired session for user {}", session.user_id);
            self.destroy(token).await?;
            return Ok(None);
        }

        sqlx::query("UPDATE sessions SET last_activity = $1 WHERE token = $2")
            .bind(Utc::now())
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(Some(session.user_id))
    }

    /// Idempotent: destroying a token with no matching session succeeds.
    pub async fn destroy(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes every expired session and returns how many were removed.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// A fresh session token: 64 alphanumeric characters drawn from the OS
/// CSPRNG. The value is opaque; identity lives entirely server-side.
pub fn generate_token() -> String {
    OsRng
        .sample_iter(rand::distributions::Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
