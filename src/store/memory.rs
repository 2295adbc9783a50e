/// In-memory stores
///
/// Same contracts as the Postgres stores, backed by a mutex-guarded map.
/// Used by the test suites and for running without a database. The lock is
/// never held across an `.await`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::configuration::Platform;
use crate::error::{AppError, DatabaseError};
use crate::store::refresh_tokens::{
    ensure_reset_allowed, log_if_conflict, RefreshToken, RefreshTokenStore,
};
use crate::store::chirps::{chirp_not_found, Chirp, ChirpStore};
use crate::store::users::{User, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Database(DatabaseError::Unavailable("store lock poisoned".to_string())))
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(
        &self,
        token: &str,
        user_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError> {
        let result = lock(&self.tokens).and_then(|mut tokens| {
            if tokens.contains_key(token) {
                return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                    "refresh_tokens_pkey".to_string(),
                )));
            }

            let now = Utc::now();
            let record = RefreshToken {
                token: token.to_string(),
                created_at: now,
                updated_at: now,
                user_id,
                expires_at,
                revoked_at: None,
            };
            tokens.insert(token.to_string(), record.clone());
            Ok(record)
        });

        log_if_conflict(&result);
        result
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AppError> {
        Ok(lock(&self.tokens)?.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<RefreshToken, AppError> {
        let mut tokens = lock(&self.tokens)?;
        match tokens.get_mut(token) {
            Some(record) if record.revoked_at.is_none() => {
                let now = Utc::now();
                record.revoked_at = Some(now);
                record.updated_at = now;
                Ok(record.clone())
            }
            _ => Err(AppError::Database(DatabaseError::NotFound(
                "Active refresh token not found".to_string(),
            ))),
        }
    }

    async fn delete_all_for_reset(&self, platform: Platform) -> Result<u64, AppError> {
        ensure_reset_allowed(platform)?;

        let mut tokens = lock(&self.tokens)?;
        let deleted = tokens.len() as u64;
        tokens.clear();
        Ok(deleted)
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)?.values().find(|u| u.email == email).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            )));
        }

        let user = users.get_mut(&id).ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("User not found".to_string()))
        })?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut users = lock(&self.users)?;
        let deleted = users.len() as u64;
        users.clear();
        Ok(deleted)
    }
}

#[derive(Default)]
pub struct InMemoryChirpStore {
    chirps: Mutex<Vec<Chirp>>,
}

impl InMemoryChirpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChirpStore for InMemoryChirpStore {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        lock(&self.chirps)?.push(chirp.clone());
        Ok(chirp)
    }

    async fn list(&self, author: Option<Uuid>) -> Result<Vec<Chirp>, AppError> {
        Ok(lock(&self.chirps)?
            .iter()
            .filter(|c| author.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        Ok(lock(&self.chirps)?.iter().find(|c| c.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut chirps = lock(&self.chirps)?;
        let before = chirps.len();
        chirps.retain(|c| c.id != id);
        if chirps.len() == before {
            return Err(chirp_not_found());
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut chirps = lock(&self.chirps)?;
        let deleted = chirps.len() as u64;
        chirps.clear();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_and_find_token() {
        let store = InMemoryRefreshTokenStore::new();
        let owner = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(60);

        let created = store.create("tok", Some(owner), expires_at).await.unwrap();
        let found = store.find_by_token("tok").await.unwrap().expect("token should exist");

        assert_eq!(created, found);
        assert_eq!(found.user_id, Some(owner));
        assert_eq!(found.expires_at, expires_at);
        assert!(found.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_token_is_conflict() {
        let store = InMemoryRefreshTokenStore::new();
        let expires_at = Utc::now() + Duration::days(60);
        store.create("tok", None, expires_at).await.unwrap();

        let result = store.create("tok", Some(Uuid::new_v4()), expires_at).await;

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
        let kept = store.find_by_token("tok").await.unwrap().unwrap();
        assert_eq!(kept.user_id, None);
    }

    #[tokio::test]
    async fn test_revoke_is_one_way() {
        let store = InMemoryRefreshTokenStore::new();
        store
            .create("tok", Some(Uuid::new_v4()), Utc::now() + Duration::days(60))
            .await
            .unwrap();

        let revoked = store.revoke("tok").await.unwrap();
        assert!(revoked.revoked_at.is_some());

        let again = store.revoke("tok").await;
        assert!(matches!(again, Err(AppError::Database(DatabaseError::NotFound(_)))));

        let stored = store.find_by_token("tok").await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, revoked.revoked_at);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let store = InMemoryRefreshTokenStore::new();

        let result = store.revoke("missing").await;

        assert!(matches!(result, Err(AppError::Database(DatabaseError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_reset_refused_in_production() {
        let store = InMemoryRefreshTokenStore::new();
        store.create("tok", None, Utc::now()).await.unwrap();

        assert!(store.delete_all_for_reset(Platform::Production).await.is_err());
        assert_eq!(store.delete_all_for_reset(Platform::Dev).await.unwrap(), 1);
        assert!(store.find_by_token("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let store = InMemoryUserStore::new();
        store.create_user("a@b.com", "digest").await.unwrap();

        let result = store.create_user("a@b.com", "digest").await;

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_credentials() {
        let store = InMemoryUserStore::new();
        let user = store.create_user("a@b.com", "old").await.unwrap();

        let updated = store.update_credentials(user.id, "c@d.com", "new").await.unwrap();

        assert_eq!(updated.email, "c@d.com");
        assert_eq!(updated.hashed_password, "new");
        assert!(store.find_by_email("a@b.com").await.unwrap().is_none());
        assert_eq!(store.find_by_email("c@d.com").await.unwrap().unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_chirps_listed_oldest_first_and_filtered_by_author() {
        let store = InMemoryChirpStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.create(alice, "first").await.unwrap();
        store.create(bob, "second").await.unwrap();
        store.create(alice, "third").await.unwrap();

        let all: Vec<String> = store.list(None).await.unwrap().into_iter().map(|c| c.body).collect();
        let by_alice: Vec<String> =
            store.list(Some(alice)).await.unwrap().into_iter().map(|c| c.body).collect();

        assert_eq!(all, vec!["first", "second", "third"]);
        assert_eq!(by_alice, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn test_delete_chirp() {
        let store = InMemoryChirpStore::new();
        let chirp = store.create(Uuid::new_v4(), "hello").await.unwrap();

        store.delete(chirp.id).await.unwrap();

        assert!(store.find_by_id(chirp.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(chirp.id).await,
            Err(AppError::Database(DatabaseError::NotFound(_)))
        ));
    }
}
