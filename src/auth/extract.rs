/// Credential Extraction
///
/// Pulls bearer tokens and API keys out of the `Authorization`
/// header. Absent header and wrong scheme are distinct errors internally;
/// both render as the same 401 at the HTTP boundary.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::{AppError, AuthError};

const BEARER_SCHEME: &str = "Bearer ";
const API_KEY_SCHEME: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    credential_with_scheme(headers, BEARER_SCHEME)
}

/// Extract the key from `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<String, AppError> {
    credential_with_scheme(headers, API_KEY_SCHEME)
}

fn credential_with_scheme(headers: &HeaderMap, scheme: &str) -> Result<String, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Auth(AuthError::MissingCredentials))?
        .to_str()
        .map_err(|_| AppError::Auth(AuthError::Malformed))?;

    let credential = value
        .strip_prefix(scheme)
        .ok_or(AppError::Auth(AuthError::Malformed))?
        .trim();

    if credential.is_empty() || credential.contains(' ') {
        return Err(AppError::Auth(AuthError::Malformed));
    }

    Ok(credential.to_string())
}
