/// Refresh Token Store
///
/// Authoritative record of every refresh token ever issued. Rows are created
/// at login, updated at most once (to set `revoked_at`) and only deleted by
/// the development reset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::configuration::Platform;
use crate::error::{AppError, AuthError, DatabaseError};

/// Database model for the `refresh_tokens` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RefreshToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner. `None` once the user has been deleted.
    pub user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable to mint an access token: not revoked and not expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a new active token. A duplicate value is a conflict, never an overwrite.
    async fn create(
        &self,
        token: &str,
        user_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AppError>;

    /// Set `revoked_at`. Unknown and already revoked tokens are `NotFound`.
    async fn revoke(&self, token: &str) -> Result<RefreshToken, AppError>;

    /// Delete every token. Refused outside `Platform::Dev`.
    async fn delete_all_for_reset(&self, platform: Platform) -> Result<u64, AppError>;
}

pub(crate) fn ensure_reset_allowed(platform: Platform) -> Result<(), AppError> {
    if platform != Platform::Dev {
        tracing::warn!(?platform, "Refresh token reset refused outside dev");
        return Err(AppError::Auth(AuthError::Forbidden));
    }
    Ok(())
}

pub(crate) fn log_if_conflict(result: &Result<RefreshToken, AppError>) {
    if let Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_))) = result {
        tracing::error!("Refresh token collision on insert; the token source may be broken");
    }
}

/// Postgres-backed store. Every operation is a single statement.
#[derive(Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn create(
        &self,
        token: &str,
        user_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError> {
        let result = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at, revoked_at)
            VALUES ($1, $2, $2, $3, $4, NULL)
            RETURNING token, created_at, updated_at, user_id, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(Utc::now())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from);

        log_if_conflict(&result);
        result
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AppError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT token, created_at, updated_at, user_id, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke(&self, token: &str) -> Result<RefreshToken, AppError> {
        let now = Utc::now();

        sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1, updated_at = $1
            WHERE token = $2 AND revoked_at IS NULL
            RETURNING token, created_at, updated_at, user_id, expires_at, revoked_at
            "#,
        )
        .bind(now)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(
                "Active refresh token not found".to_string(),
            ))
        })
    }

    async fn delete_all_for_reset(&self, platform: Platform) -> Result<u64, AppError> {
        ensure_reset_allowed(platform)?;

        let result = sqlx::query("DELETE FROM refresh_tokens")
            .execute(&self.pool)
            .await?;

        tracing::info!(deleted = result.rows_affected(), "All refresh tokens deleted");
        Ok(result.rows_affected())
    }
}
