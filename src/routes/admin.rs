/// Admin Routes
///
/// Visit metrics and the development-only reset.

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::Platform;
use crate::error::AppError;
use crate::metrics::VisitCounter;
use crate::store::{ChirpStore, RefreshTokenStore, UserStore};

/// GET /admin/metrics
pub async fn metrics(visits: web::Data<VisitCounter>) -> HttpResponse {
    let body = format!(
        r#"<html>
    <body>
        <h1>Welcome, Chirpy Admin</h1>
        <p>Chirpy has been visited {} times!</p>
    </body>
</html>"#,
        visits.count()
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

/// POST /admin/reset
///
/// Deletes all refresh tokens, chirps and users and zeroes the visit counter.
///
/// # Errors
/// - 403: platform is not `dev`
pub async fn reset(
    platform: web::Data<Platform>,
    refresh_tokens: web::Data<dyn RefreshTokenStore>,
    chirps: web::Data<dyn ChirpStore>,
    users: web::Data<dyn UserStore>,
    visits: web::Data<VisitCounter>,
) -> Result<HttpResponse, AppError> {
    let tokens_deleted = refresh_tokens.delete_all_for_reset(*platform.get_ref()).await?;
    let chirps_deleted = chirps.delete_all().await?;
    let users_deleted = users.delete_all().await?;
    visits.reset();

    tracing::info!(
        tokens_deleted,
        chirps_deleted,
        users_deleted,
        "Development reset completed"
    );

    Ok(HttpResponse::Ok().body("OK"))
}
