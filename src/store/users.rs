/// User Store
///
/// Credential records: identity, lookup email and bcrypt digest.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;

/// Database model for the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
}

/// Public view of a user. Never carries the password digest.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            email: user.email.clone(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A taken email is a `UniqueConstraintViolation`.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Replace email and digest. Unknown id is `NotFound`.
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, AppError>;

    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password)
            VALUES ($1, $2, $2, $3, $4)
            RETURNING id, created_at, updated_at, email, hashed_password
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET updated_at = $2, email = $3, hashed_password = $4
            WHERE id = $1
            RETURNING id, created_at, updated_at, email, hashed_password
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;

        tracing::info!(deleted = result.rows_affected(), "All users deleted");
        Ok(result.rows_affected())
    }
}
