/// Chirp Store
///
/// Short posts owned by a user. Rows are removed with their author.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};

/// Database model for the `chirps` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChirpView {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub user_id: String,
}

impl From<&Chirp> for ChirpView {
    fn from(chirp: &Chirp) -> Self {
        Self {
            id: chirp.id.to_string(),
            created_at: chirp.created_at.to_rfc3339(),
            updated_at: chirp.updated_at.to_rfc3339(),
            body: chirp.body.clone(),
            user_id: chirp.user_id.to_string(),
        }
    }
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError>;

    /// Oldest first. `author` narrows the list to one user's chirps.
    async fn list(&self, author: Option<Uuid>) -> Result<Vec<Chirp>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, AppError>;

    /// Unknown id is `NotFound`.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    async fn delete_all(&self) -> Result<u64, AppError>;
}

pub(crate) fn chirp_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("Chirp not found".to_string()))
}

#[derive(Clone)]
pub struct PgChirpStore {
    pool: PgPool,
}

impl PgChirpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChirpStore for PgChirpStore {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $2, $3, $4)
            RETURNING id, created_at, updated_at, body, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn list(&self, author: Option<Uuid>) -> Result<Vec<Chirp>, AppError> {
        let chirps = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        Ok(chirps)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(chirp_not_found());
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM chirps").execute(&self.pool).await?;

        tracing::info!(deleted = result.rows_affected(), "All chirps deleted");
        Ok(result.rows_affected())
    }
}
