/// Chirp Routes
///
/// Reads are public. Create and delete run behind `JwtMiddleware`; only the
/// author may delete a chirp.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::{chirp_not_found, Chirp, ChirpStore, ChirpView};
use crate::validators::validate_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
    /// Optional, must name the caller when present
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ChirpList {
    pub items: Vec<ChirpView>,
}

/// Only the caller may act as the owner of `owner`'s resources
fn ensure_owner(caller: &AuthenticatedUser, owner: Uuid) -> Result<(), AppError> {
    if caller.user_id != owner {
        tracing::warn!(
            user_id = %caller.user_id,
            owner_id = %owner,
            "User acted on another user's chirps"
        );
        return Err(AppError::Auth(AuthError::Forbidden));
    }
    Ok(())
}

/// POST /api/chirps
///
/// **Requires a valid access token.**
///
/// # Errors
/// - 400: empty body or longer than 140 characters
/// - 403: `user_id` names someone other than the caller
pub async fn create_chirp(
    form: web::Json<CreateChirpRequest>,
    caller: web::ReqData<AuthenticatedUser>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("create_chirp").with_user_id(caller.user_id.to_string());

    if let Some(owner) = form.user_id {
        ensure_owner(&caller, owner)?;
    }
    validate_chirp_body(&form.body)?;

    let chirp = chirps.create(caller.user_id, &form.body).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        chirp_id = %chirp.id,
        "Chirp created"
    );

    Ok(HttpResponse::Created().json(ChirpView::from(&chirp)))
}

/// GET /api/chirps?author_id=<uuid>
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let items = chirps
        .list(query.author_id)
        .await?
        .iter()
        .map(ChirpView::from)
        .collect();

    Ok(HttpResponse::Ok().json(ChirpList { items }))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<Uuid>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp = find_chirp(chirps.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ChirpView::from(&chirp)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// **Requires a valid access token.**
///
/// # Errors
/// - 403: caller is not the author
/// - 404: no such chirp
pub async fn delete_chirp(
    path: web::Path<Uuid>,
    caller: web::ReqData<AuthenticatedUser>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp = find_chirp(chirps.get_ref(), path.into_inner()).await?;
    ensure_owner(&caller, chirp.user_id)?;

    chirps.delete(chirp.id).await?;
    tracing::info!(user_id = %caller.user_id, chirp_id = %chirp.id, "Chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}

async fn find_chirp(chirps: &dyn ChirpStore, id: Uuid) -> Result<Chirp, AppError> {
    chirps.find_by_id(id).await?.ok_or_else(chirp_not_found)
}
