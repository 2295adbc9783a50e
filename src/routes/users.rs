/// User Routes
///
/// Account creation and credential updates.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::hash_password;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::{UserProfile, UserStore};
use crate::validators::{is_valid_email, validate_password_length};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password length
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("create_user");

    let email = is_valid_email(&form.email)?;
    validate_password_length(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let user = users.create_user(&email, &hashed_password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User created"
    );

    Ok(HttpResponse::Created().json(UserProfile::from(&user)))
}

/// PUT /api/users
///
/// **Requires a valid access token.** Replaces the caller's email and password.
pub async fn update_user(
    form: web::Json<CredentialsRequest>,
    caller: web::ReqData<AuthenticatedUser>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("update_user").with_user_id(caller.user_id.to_string());

    let email = is_valid_email(&form.email)?;
    validate_password_length(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let user = users
        .update_credentials(caller.user_id, &email, &hashed_password)
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User credentials updated"
    );

    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}
