/// Access Token Issue and Verification
///
/// Access tokens are HS256 JWTs carrying `{iss, sub, iat, exp}`. They are
/// never persisted: validity is signature plus expiry, checked against the
/// wall clock with no leeway. Verification is pinned to HS256 regardless of
/// the algorithm named in the token header.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, ConfigError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issue an access token for `subject` using the configured key and lifetime
pub fn issue_access_token(subject: &Uuid, settings: &AuthSettings) -> Result<String, AppError> {
    encode_access_token(subject, &settings.signing_key, settings.access_token_ttl())
}

/// Sign a new access token for `subject`, valid for `ttl` from now
///
/// # Errors
/// Returns a configuration error if the signing key is empty
pub fn encode_access_token(
    subject: &Uuid,
    signing_key: &str,
    ttl: chrono::Duration,
) -> Result<String, AppError> {
    ensure_signing_key(signing_key)?;

    let claims = Claims::new(*subject, ttl);

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify an access token and return its subject
///
/// # Errors
/// Every rejection (signature, algorithm, expiry, issuer, subject) is
/// `AuthError::Unauthenticated`. The concrete reason is only logged.
pub fn verify_access_token(token: &str, signing_key: &str) -> Result<Uuid, AppError> {
    ensure_signing_key(signing_key)?;

    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        AppError::Auth(AuthError::Unauthenticated)
    })?;

    claims.subject().ok_or_else(|| {
        tracing::warn!("Access token subject is not a valid user id");
        AppError::Auth(AuthError::Unauthenticated)
    })
}

fn ensure_signing_key(signing_key: &str) -> Result<(), AppError> {
    if signing_key.is_empty() {
        return Err(AppError::Config(ConfigError::MissingRequired(
            "auth.signing_key".to_string(),
        )));
    }
    Ok(())
}
