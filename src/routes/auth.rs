/// Session Routes
///
/// Thin HTTP wrappers over `SessionService`.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::SessionService;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
/// - 503: storage unavailable
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let response = sessions.login(&form.email, &form.password).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. Returns a new access
/// token; the refresh token keeps its expiry.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let response = sessions.refresh(req.headers()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. 204 on success.
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(req.headers()).await?;
    Ok(HttpResponse::NoContent().finish())
}
