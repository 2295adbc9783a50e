/// Session Service
///
/// Composes password verification, access token issue and the refresh token
/// store into login, refresh and revoke. Holds no mutable state of its own;
/// every durable change goes through a store.
///
/// Refresh token states: `active` -> `expired` | `revoked`. Both end states
/// are terminal. Callers only ever see `Unauthenticated` for a token that is
/// not active; which state it was in is logged.

use actix_web::http::header::HeaderMap;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{bearer_token, generate_refresh_token, issue_access_token, verify_password};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{RefreshToken, RefreshTokenStore, UserProfile, UserStore};

/// Login result: the profile plus both credentials
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            settings,
        }
    }

    /// Exchange email and password for an access token and a new refresh token
    ///
    /// # Errors
    /// - `Unauthenticated` for an unknown email or a wrong password (not distinguished)
    /// - storage errors as-is
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        // Stored emails are trimmed at registration
        let user = match self.users.find_by_email(email.trim()).await? {
            Some(user) => user,
            None => {
                tracing::info!("Login for unknown email");
                return Err(AppError::Auth(AuthError::Unauthenticated));
            }
        };

        if !verify_password(password, &user.hashed_password)? {
            tracing::info!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::Auth(AuthError::Unauthenticated));
        }

        let token = issue_access_token(&user.id, &self.settings)?;
        let refresh_token = generate_refresh_token()?;
        let expires_at = Utc::now() + self.settings.refresh_token_ttl();
        self.refresh_tokens
            .create(&refresh_token, Some(user.id), expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            profile: UserProfile::from(&user),
            token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.settings.access_token_ttl_secs,
        })
    }

    /// Mint a new access token from the bearer refresh token
    ///
    /// The refresh token itself is left untouched: no rotation, no extension.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<RefreshResponse, AppError> {
        let presented = bearer_token(headers)?;
        let record = self.find_active(&presented).await?;

        let user_id = record.user_id.ok_or_else(|| {
            tracing::warn!("Refresh token is detached from any user");
            AppError::Auth(AuthError::Unauthenticated)
        })?;

        let token = issue_access_token(&user_id, &self.settings)?;
        tracing::info!(user_id = %user_id, "Access token refreshed");

        Ok(RefreshResponse { token })
    }

    /// Permanently revoke the bearer refresh token
    ///
    /// Expired and already revoked tokens are rejected rather than treated as
    /// a successful no-op.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let presented = bearer_token(headers)?;
        let record = self.find_active(&presented).await?;

        match self.refresh_tokens.revoke(&record.token).await {
            Ok(revoked) => {
                tracing::info!(user_id = ?revoked.user_id, "Refresh token revoked");
                Ok(())
            }
            // Lost a race with a concurrent revoke
            Err(AppError::Database(DatabaseError::NotFound(_))) => {
                tracing::warn!("Refresh token already revoked");
                Err(AppError::Auth(AuthError::Unauthenticated))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_active(&self, presented: &str) -> Result<RefreshToken, AppError> {
        let record = match self.refresh_tokens.find_by_token(presented).await? {
            Some(record) => record,
            None => {
                tracing::warn!("Refresh token not found");
                return Err(AppError::Auth(AuthError::Unauthenticated));
            }
        };

        if !record.is_active_at(Utc::now()) {
            if record.is_revoked() {
                tracing::warn!(user_id = ?record.user_id, "Attempt to use revoked refresh token");
            } else {
                tracing::info!(user_id = ?record.user_id, "Refresh token expired");
            }
            return Err(AppError::Auth(AuthError::Unauthenticated));
        }

        Ok(record)
    }
}
